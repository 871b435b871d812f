pub mod assessment_dto;
pub mod candidate_dto;
pub mod common_dto;
pub mod job_dto;
