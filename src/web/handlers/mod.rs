pub mod pdfs;
pub mod users;

pub use pdfs::{create_pdf, delete_pdf, get_pdf, list_pdfs, save};
pub use users::{create_user, list_users, update_user};
