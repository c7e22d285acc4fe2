//! Useful algorithms related to RSA.

pub(crate) mod generate;
pub(crate) mod pad;
pub(crate) mod pkcs1v15;
pub(crate) mod rsa;
