// Data transfer models shared by the API client and the wizard.

pub mod requests;
pub mod responses;
