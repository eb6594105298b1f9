use std::path::PathBuf;

/// Inputs for the generated POSIX shell profile at `home/.profile`.
///
/// The profile exports the same variables the dotenv file carries, plus
/// a best-effort source of an optional override file so local tweaks
/// survive reinstalls.
#[derive(Debug, Clone)]
pub struct ShellProfile {
    pub home: PathBuf,
    pub prefix: PathBuf,
    pub bin_dir: PathBuf,
    pub lib_dir: PathBuf,
    pub payload_dir: PathBuf,
    pub override_file: Option<PathBuf>,
}

impl ShellProfile {
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("# Generated shell profile\n");
        out.push_str(&format!("export HOME={}\n", self.home.display()));
        out.push_str(&format!("export PREFIX={}\n", self.prefix.display()));
        out.push_str(&format!("export PATH={}:$PATH\n", self.bin_dir.display()));
        out.push_str(&format!(
            "export LD_LIBRARY_PATH={}:{}:$LD_LIBRARY_PATH\n",
            self.payload_dir.display(),
            self.lib_dir.display()
        ));

        if let Some(override_file) = &self.override_file {
            out.push('\n');
            out.push_str(&format!(
                "if [ -f {path} ]; then\n    . {path}\nfi\n",
                path = override_file.display()
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn profile() -> ShellProfile {
        ShellProfile {
            home: "/prefix/home".into(),
            prefix: "/prefix".into(),
            bin_dir: "/prefix/bin".into(),
            lib_dir: "/prefix/lib".into(),
            payload_dir: "/payload".into(),
            override_file: None,
        }
    }

    #[test]
    fn test_render_exports_path_with_bin_prepended() {
        let rendered = profile().render();
        assert!(rendered.contains("export PATH=/prefix/bin:$PATH\n"));
    }

    #[test]
    fn test_render_orders_payload_before_lib_dir() {
        let rendered = profile().render();
        assert!(rendered.contains("export LD_LIBRARY_PATH=/payload:/prefix/lib:$LD_LIBRARY_PATH\n"));
    }

    #[test]
    fn test_render_sources_override_when_configured() {
        let mut p = profile();
        p.override_file = Some(Path::new("/data/local/override.sh").to_path_buf());
        let rendered = p.render();
        assert!(rendered.contains("if [ -f /data/local/override.sh ]; then"));
        assert!(rendered.contains(". /data/local/override.sh"));
    }

    #[test]
    fn test_render_omits_source_block_without_override() {
        assert!(!profile().render().contains("if [ -f"));
    }
}
