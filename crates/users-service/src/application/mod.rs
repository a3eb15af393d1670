pub mod create_user;

pub use create_user::{CreateUser, CreateUserInput, CreateUserOutput};
