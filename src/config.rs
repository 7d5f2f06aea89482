use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub source_directory: PathBuf,
    pub branch: String,
    pub repository_url: String,
    pub user: User,
    pub dotfiles: bool,

    pub message: String,
    pub remote: String,
    pub dest: PathBuf,
    pub add: bool,
    pub history: bool,
    pub push: bool,
    pub nojekyll: bool,
    pub cname: Option<String>,
}

impl Config {
    pub fn webj2j() -> Self {
        Config {
            source_directory: PathBuf::from("build"),
            branch: "gh-pages".to_string(),
            repository_url: "https://github.com/blluv/WebJ2J".to_string(),
            user: User {
                name: "blluv".to_string(),
                email: "biluv@protonmail.com".to_string(),
            },
            dotfiles: true,
            ..Config::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_directory: PathBuf::from("."),
            branch: "gh-pages".to_string(),
            repository_url: String::new(),
            user: User {
                name: String::new(),
                email: String::new(),
            },
            dotfiles: false,
            message: "Updates".to_string(),
            remote: "origin".to_string(),
            dest: PathBuf::from("."),
            add: false,
            history: true,
            push: true,
            nojekyll: false,
            cname: None,
        }
    }
}
