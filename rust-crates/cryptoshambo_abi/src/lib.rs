use fuels::types::ContractId;

pub mod cryptoshambo_types {
    use fuels::macros::abigen;

    abigen!(Contract(
        name = "Cryptoshambo",
        abi = "rust-crates/cryptoshambo_abi/abi/cryptoshambo-abi.json"
    ));
}

/// Built-in default contract id, used when neither `--contract-id` nor a
/// deployment record names one.
pub const CRYPTOSHAMBO_CONTRACT_ID: &str =
    "0xa94a990279cf868cf53011fcf59406a951dfb80dd31ef3795d8b1ecad7b7af93";

pub fn contract_instance<A>(id: ContractId, account: A) -> cryptoshambo_types::Cryptoshambo<A> {
    cryptoshambo_types::Cryptoshambo::new(id, account)
}
