pub mod help;
pub mod reproducer;
pub mod root;
pub mod song_list;
