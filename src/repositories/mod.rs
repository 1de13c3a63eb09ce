pub mod boleto_repo;

pub use boleto_repo::{BoletoRepo, CreateBoleto, StatusTransition};
