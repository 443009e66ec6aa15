pub mod customer;
pub mod estimate_detail;
pub mod estimate_header;
pub mod job_card;
pub mod organization;
pub mod organization_member;
pub mod product;
pub mod project;
pub mod subscription;
pub mod user;
