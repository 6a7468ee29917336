/// The `version` command output.
pub fn handle() -> String {
    format!("{} {}", clap::crate_name!(), clap::crate_version!())
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_version_names_crate() {
        assert_eq!(
            super::handle(),
            format!("mdweave {}", env!("CARGO_PKG_VERSION"))
        );
    }
}
