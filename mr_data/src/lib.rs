pub mod cfl;
