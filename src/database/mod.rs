pub mod memory;
pub mod pool;
pub mod postgres;
pub mod repository;

pub use repository::{
    AccountRepository, ApplicationRepository, InterviewRepository, JobRepository, Repositories,
};
