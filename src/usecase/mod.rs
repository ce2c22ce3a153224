pub mod authenticate_usecase;
pub mod user_usecase;
