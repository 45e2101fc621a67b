pub mod asn1;
pub mod cms;
pub mod constants;
pub mod crypto;
pub mod pem;
pub mod verification;
