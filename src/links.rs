use anyhow::Context;

/// Social link markers and where they lead. Order is the lookup order.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTable {
    entries: Vec<SocialLink>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SocialLink {
    pub marker: String,
    pub url: String,
}

pub type LinkId = usize;

impl LinkTable {
    pub fn new(entries: impl IntoIterator<Item = (&'static str, &'static str)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(marker, url)| SocialLink {
                    marker: marker.to_string(),
                    url: url.to_string(),
                })
                .collect(),
        }
    }

    /// First link whose marker appears in `name`.
    pub fn match_name(&self, name: &str) -> Option<LinkId> {
        self.entries
            .iter()
            .position(|link| name.contains(link.marker.as_str()))
    }

    pub fn get(&self, id: LinkId) -> Option<&SocialLink> {
        self.entries.get(id)
    }
}

impl Default for LinkTable {
    fn default() -> Self {
        Self::new([
            ("github", "https://github.com/sipsjava"),
            ("linkedin", "https://www.linkedin.com/in/britneyannbeall/"),
        ])
    }
}

/// Opens a URL in a browsing context that shares nothing with the viewer.
pub trait LinkOpener {
    fn open(&mut self, url: &str) -> anyhow::Result<()>;
}

/// Hands the URL to the platform's default browser in a separate process.
pub struct SystemBrowser;

impl LinkOpener for SystemBrowser {
    fn open(&mut self, url: &str) -> anyhow::Result<()> {
        open::that_detached(url).with_context(|| format!("Failed to launch browser for {url}"))?;

        log::info!("Opened {url}");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shares its log so it can still be read after being boxed.
    #[derive(Default, Clone)]
    pub(crate) struct RecordingOpener {
        pub opened: Rc<RefCell<Vec<String>>>,
    }

    impl RecordingOpener {
        pub fn opened(&self) -> Vec<String> {
            self.opened.borrow().clone()
        }
    }

    impl LinkOpener for RecordingOpener {
        fn open(&mut self, url: &str) -> anyhow::Result<()> {
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn system_browser_boxes_as_link_opener() {
        let opener: Box<dyn LinkOpener> = Box::new(SystemBrowser);
        drop(opener);
    }

    #[test]
    fn matches_markers_by_substring() {
        let links = LinkTable::default();
        let github = links.match_name("github_sign_target").unwrap();
        assert_eq!(links.get(github).unwrap().url, "https://github.com/sipsjava");

        let linkedin = links.match_name("poster_linkedin_target").unwrap();
        assert_eq!(
            links.get(linkedin).unwrap().url,
            "https://www.linkedin.com/in/britneyannbeall/"
        );

        assert!(links.match_name("email_target").is_none());
    }
}
