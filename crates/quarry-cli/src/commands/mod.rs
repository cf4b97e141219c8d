pub mod create;
pub mod dirty;
pub mod events;
pub mod import;
pub mod init;
pub mod show;
pub mod vocab;
