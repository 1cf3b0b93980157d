pub use super::appointments::Entity as Appointments;
pub use super::users::Entity as Users;
