pub mod approval_types;
pub mod claim_statuses;
pub mod testimonial_statuses;
