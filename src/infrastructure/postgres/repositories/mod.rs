pub mod approved_testimonials;
pub mod testimonials;
pub mod users;
pub mod vessel_claims;
pub mod vessels;
