pub mod boleto;

pub use boleto::{Boleto, BoletoStatus, CreateBoletoRequest};
