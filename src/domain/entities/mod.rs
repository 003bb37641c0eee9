pub mod approved_testimonials;
pub mod testimonials;
pub mod users;
pub mod vessel_assignments;
pub mod vessel_claim_requests;
pub mod vessel_signing_authorities;
pub mod vessels;
