pub mod doctor;
pub mod draft;
pub mod init;
