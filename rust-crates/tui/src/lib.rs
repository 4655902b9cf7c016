pub use cryptoshambo_abi::{
    CRYPTOSHAMBO_CONTRACT_ID,
    cryptoshambo_types,
};

pub mod cli;
pub mod client;
pub mod contract;
pub mod page;
pub mod ui;
pub mod wallets;
