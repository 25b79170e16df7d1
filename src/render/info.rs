use std::{env, fs};

use chrono::{Local, SecondsFormat};

/// Facts about the producing process, drawn as a side table in the diagram.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessInfo {
    entries: Vec<(String, String)>,
}

impl ProcessInfo {
    pub fn collect(caption: Option<&str>) -> Self {
        let mut info = Self::default();

        info.add("date", Local::now().to_rfc3339_opts(SecondsFormat::Secs, false));
        info.add("PID", std::process::id().to_string());

        if let Some(app) = env::args().next() {
            let app = app.replace('\\', "/");
            info.add("app", app.rsplit('/').next().unwrap_or(&app));
        }

        info.add("os/arch", format!("{} / {}", env::consts::OS, env::consts::ARCH));
        if let Ok(cpus) = std::thread::available_parallelism() {
            info.add("cpus", cpus.to_string());
        }
        info.add("version", env!("CARGO_PKG_VERSION"));

        if let Some(caption) = caption.filter(|caption| !caption.is_empty()) {
            info.add("comment", caption);
        }
        if let Some(host) = hostname() {
            info.add("hostname", host);
        }
        if let Ok(wd) = env::current_dir() {
            info.add("wd", wd.display().to_string());
        }
        if let Some(user) = env_any(&["USER", "USERNAME"]) {
            info.add("user", user);
        }

        info
    }

    /// Sets `key`, replacing an earlier value.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by key, ignoring case.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut entries = self
            .entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect::<Vec<_>>();
        entries.sort_by_key(|(key, _)| key.to_lowercase());
        entries
    }
}

fn env_any(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| env::var(name).ok())
        .filter(|value| !value.is_empty())
}

fn hostname() -> Option<String> {
    env_any(&["HOSTNAME", "COMPUTERNAME"]).or_else(|| {
        fs::read_to_string("/etc/hostname")
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|host| !host.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_sort_case_insensitively() {
        let mut info = ProcessInfo::default();
        info.add("wd", "/tmp");
        info.add("PID", "42");
        info.add("app", "memgraph");
        info.add("pid", "43");

        let keys = info.sorted().into_iter().map(|(key, _)| key).collect::<Vec<_>>();
        assert_eq!(keys, ["app", "PID", "pid", "wd"]);
    }

    #[test]
    fn collect_includes_the_caption() {
        let info = ProcessInfo::collect(Some("snapshot"));
        assert!(info.sorted().contains(&("comment", "snapshot")));
        assert!(info.sorted().iter().any(|(key, _)| *key == "PID"));
    }

    #[test]
    fn date_is_rfc3339() {
        let info = ProcessInfo::collect(None);
        let (_, date) = info
            .sorted()
            .into_iter()
            .find(|(key, _)| *key == "date")
            .expect("date entry");

        assert!(chrono::DateTime::parse_from_rfc3339(date).is_ok(), "{date}");
        assert!(!info.sorted().iter().any(|(key, _)| *key == "comment"));
    }
}
