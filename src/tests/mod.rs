pub mod attack_tests;
pub mod tolerance_tests;
