pub mod application;
pub mod apply;
pub mod auth;
pub mod check;
pub mod completions;
pub mod contact;
pub mod init;
pub mod programs;
pub mod university;
