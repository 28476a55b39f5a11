pub mod index_bootstrap;
