/// Log tags identifying the originating module
///
/// Each tag maps to a --debug-<key> command line flag for selective
/// diagnostic output.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    Channel,
    Events,
    Notify,
    Callbacks,
    Session,
    System,
}

impl LogTag {
    /// Key used for the --debug-<key> flag
    pub fn to_debug_key(&self) -> &'static str {
        match self {
            LogTag::Channel => "channel",
            LogTag::Events => "events",
            LogTag::Notify => "notify",
            LogTag::Callbacks => "callbacks",
            LogTag::Session => "session",
            LogTag::System => "system",
        }
    }

    /// Uncolored display name
    pub fn to_plain_string(&self) -> &'static str {
        match self {
            LogTag::Channel => "CHANNEL",
            LogTag::Events => "EVENTS",
            LogTag::Notify => "NOTIFY",
            LogTag::Callbacks => "CALLBACKS",
            LogTag::Session => "SESSION",
            LogTag::System => "SYSTEM",
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
