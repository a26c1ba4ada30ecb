/// Adam optimisation loop
pub mod trainer;
