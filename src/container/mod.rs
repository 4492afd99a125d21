pub mod extendible_hash;

#[cfg(test)]
mod extendible_hash_test;
