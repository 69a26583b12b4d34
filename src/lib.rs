pub mod cli {
    pub mod parser;
}
pub mod config;
pub mod github {
    pub mod issues;
    pub mod search;
}
pub mod notes;
pub mod opener;
pub mod output;
pub mod run;
