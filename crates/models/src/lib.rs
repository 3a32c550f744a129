pub mod errors;
pub mod db;
pub mod cat;

#[cfg(test)]
mod tests;
