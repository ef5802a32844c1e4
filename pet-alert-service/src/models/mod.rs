pub mod alert;
pub mod pet;

pub use alert::{PetAlert, SendPetAlertRequest, FLUTTER_CLICK_ACTION};
pub use pet::{PetRecord, UserRecord};
