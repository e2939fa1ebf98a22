//! Outbound link policy and dispatch.
//!
//! In a restricted host context (an embedded in-app browser) clicks on
//! untrusted links are suspended behind a confirmation step instead of
//! navigating directly. The confirmation offers "continue" and "copy link";
//! copying falls back to a legacy scratch-surface path when the platform
//! clipboard is unavailable. All of the ephemeral state here is owned
//! explicitly and mutated from a single logical flow at a time.

use crate::config::{ContactEntry, ToastText, Whitelist};
use crate::error::RosterError;
use crate::model::MemberLink;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// User-agent signature of the embedded browser that intercepts outbound
/// navigation.
const RESTRICTED_SIGNATURE: &str = "micromessenger";

/// How long a toast stays visible.
pub const TOAST_DURATION: Duration = Duration::from_millis(2000);

/// Returns true iff the URL parses and its host contains any whitelist
/// entry as a substring. Unparseable or host-less URLs are never trusted.
pub fn is_trusted(url: &str, whitelist: &Whitelist) -> bool {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => whitelist
                .entries()
                .iter()
                .any(|entry| host.contains(entry.as_str())),
            None => false,
        },
        Err(_) => false,
    }
}

/// The runtime environment a click originates from, identified by its
/// user-agent string.
#[derive(Debug, Clone)]
pub struct HostContext {
    user_agent: String,
}

impl HostContext {
    pub fn from_user_agent(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }

    /// True when this is a known in-app embedded browser. Only restricted
    /// contexts intercept; normal browsers never do.
    pub fn is_restricted(&self) -> bool {
        self.user_agent.to_lowercase().contains(RESTRICTED_SIGNATURE)
    }
}

/// Seam for opening a URL in a new browsing context. Production hosts wire
/// this to the platform; tests use a recording impl.
pub trait Navigator {
    fn open_in_new_tab(&mut self, url: &str);
}

/// Platform clipboard write. The primary copy path.
pub trait ClipboardBackend {
    fn write_text(&mut self, text: &str) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchId(pub u64);

/// Host surface driven by the legacy fallback copy path: insert an
/// off-screen text container, issue the copy command against it, remove it.
pub trait ScratchSurface {
    fn insert_scratch(&mut self, text: &str) -> ScratchId;
    fn exec_copy(&mut self, id: ScratchId) -> bool;
    fn remove_scratch(&mut self, id: ScratchId);
}

/// Which copy path succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPath {
    Primary,
    Fallback,
}

/// Clipboard writes with a guaranteed fallback path. The fallback's
/// scratch artifact is removed whether or not the copy command succeeds.
pub struct ClipboardService<B, S> {
    primary: B,
    surface: S,
}

impl<B: ClipboardBackend, S: ScratchSurface> ClipboardService<B, S> {
    pub fn new(primary: B, surface: S) -> Self {
        Self { primary, surface }
    }

    pub fn copy(&mut self, text: &str) -> Result<CopyPath, RosterError> {
        match self.primary.write_text(text) {
            Ok(()) => Ok(CopyPath::Primary),
            Err(reason) => {
                debug!(%reason, "Primary clipboard path failed, using fallback");
                let id = self.surface.insert_scratch(text);
                let copied = self.surface.exec_copy(id);
                self.surface.remove_scratch(id);
                if copied {
                    Ok(CopyPath::Fallback)
                } else {
                    Err(RosterError::Clipboard(reason))
                }
            }
        }
    }
}

/// Transient auto-expiring status message. At most one is visible; showing
/// a new one restarts the single expiry deadline.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    message: Option<String>,
    deadline: Option<Instant>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: impl Into<String>, now: Instant) {
        self.show_for(message, TOAST_DURATION, now);
    }

    pub fn show_for(&mut self, message: impl Into<String>, duration: Duration, now: Instant) {
        self.message = Some(message.into());
        self.deadline = Some(now + duration);
    }

    /// Clears the toast once its deadline has passed.
    pub fn expire_due(&mut self, now: Instant) {
        if self.deadline.is_some_and(|deadline| deadline <= now) {
            self.message = None;
            self.deadline = None;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Dispatch state: either nothing pending, or one confirmation suspended
/// on a single URL. No queue; a new request overwrites the pending URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    ConfirmPending(String),
}

/// Decides, per click, whether to navigate directly or suspend behind a
/// confirmation step; owns that step's state and its scroll-lock side
/// effect.
#[derive(Debug)]
pub struct LinkDispatcher {
    state: DispatchState,
    scroll_locked: bool,
}

impl Default for LinkDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkDispatcher {
    pub fn new() -> Self {
        Self {
            state: DispatchState::Idle,
            scroll_locked: false,
        }
    }

    pub fn state(&self) -> &DispatchState {
        &self.state
    }

    pub fn pending_url(&self) -> Option<&str> {
        match &self.state {
            DispatchState::ConfirmPending(url) => Some(url),
            DispatchState::Idle => None,
        }
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// Handles a click on `url`. Untrusted links in a restricted context
    /// enter `ConfirmPending`; everything else opens immediately. A request
    /// while a confirmation is already open overwrites the pending URL
    /// without toggling the scroll lock again.
    pub fn request(
        &mut self,
        url: &str,
        context: &HostContext,
        whitelist: &Whitelist,
        navigator: &mut dyn Navigator,
    ) {
        if context.is_restricted() && !is_trusted(url, whitelist) {
            debug!(%url, "Suspending untrusted link behind confirmation");
            self.scroll_locked = true;
            self.state = DispatchState::ConfirmPending(url.to_string());
        } else {
            navigator.open_in_new_tab(url);
        }
    }

    /// Confirms the pending navigation.
    pub fn proceed(&mut self, navigator: &mut dyn Navigator) {
        if let DispatchState::ConfirmPending(url) =
            std::mem::replace(&mut self.state, DispatchState::Idle)
        {
            navigator.open_in_new_tab(&url);
        }
        self.scroll_locked = false;
    }

    /// Discards the pending URL without navigating.
    pub fn close(&mut self) {
        self.state = DispatchState::Idle;
        self.scroll_locked = false;
    }

    /// Copies the pending URL. Shows a success or failure toast; the
    /// confirmation stays open either way.
    pub fn copy_link<B: ClipboardBackend, S: ScratchSurface>(
        &mut self,
        clipboard: &mut ClipboardService<B, S>,
        toasts: &mut NotificationCenter,
        text: &ToastText,
        now: Instant,
    ) {
        let Some(url) = self.pending_url().map(str::to_string) else {
            return;
        };
        match clipboard.copy(&url) {
            Ok(_) => toasts.show(&text.link_copied, now),
            Err(_) => toasts.show(&text.copy_failed, now),
        }
    }
}

/// Selection step shown when a member exposes two or more outbound links.
#[derive(Debug, Default)]
pub struct HomepageChooser {
    is_open: bool,
    scroll_locked: bool,
    member_name: String,
    avatar: Option<String>,
    links: Vec<MemberLink>,
}

impl HomepageChooser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub fn links(&self) -> &[MemberLink] {
        &self.links
    }

    /// Opens the chooser over the given links. An empty list shows the
    /// "no homepage" toast and changes no state.
    pub fn open(
        &mut self,
        links: &[MemberLink],
        member_name: &str,
        avatar: Option<&str>,
        toasts: &mut NotificationCenter,
        text: &ToastText,
        now: Instant,
    ) {
        if links.is_empty() {
            toasts.show(&text.no_homepage, now);
            return;
        }
        self.links = links.to_vec();
        self.member_name = member_name.to_string();
        self.avatar = avatar.map(str::to_string);
        self.is_open = true;
        self.scroll_locked = true;
    }

    /// Delegates the chosen URL to the dispatcher, then closes. Closing is
    /// synchronous; a confirmation opened by the delegate stays open.
    pub fn choose(
        &mut self,
        url: &str,
        dispatcher: &mut LinkDispatcher,
        context: &HostContext,
        whitelist: &Whitelist,
        navigator: &mut dyn Navigator,
    ) {
        dispatcher.request(url, context, whitelist, navigator);
        self.close();
    }

    pub fn close(&mut self) {
        self.is_open = false;
        self.scroll_locked = false;
        self.member_name.clear();
        self.avatar = None;
        self.links.clear();
    }
}

/// Copies a contact channel's value to the clipboard. Success shows the
/// channel's own toast when it has one, the generic contact toast
/// otherwise; failure (after the fallback path) shows the copy-failed
/// toast.
pub fn copy_contact<B: ClipboardBackend, S: ScratchSurface>(
    entry: &ContactEntry,
    clipboard: &mut ClipboardService<B, S>,
    toasts: &mut NotificationCenter,
    text: &ToastText,
    now: Instant,
) {
    match clipboard.copy(&entry.value) {
        Ok(_) => {
            let message = entry.copied_toast.as_deref().unwrap_or(&text.contact_copied);
            toasts.show(message, now);
        }
        Err(_) => toasts.show(&text.copy_failed, now),
    }
}

/// Avatar-click entry point: no links → toast, one link → straight to the
/// dispatcher, two or more → the chooser.
#[allow(clippy::too_many_arguments)]
pub fn dispatch_homepage(
    links: &[MemberLink],
    member_name: &str,
    avatar: Option<&str>,
    chooser: &mut HomepageChooser,
    dispatcher: &mut LinkDispatcher,
    context: &HostContext,
    whitelist: &Whitelist,
    navigator: &mut dyn Navigator,
    toasts: &mut NotificationCenter,
    text: &ToastText,
    now: Instant,
) {
    match links {
        [] => toasts.show(&text.no_homepage, now),
        [only] => dispatcher.request(&only.url, context, whitelist, navigator),
        _ => chooser.open(links, member_name, avatar, toasts, text, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESTRICTED_UA: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) MicroMessenger/8.0.42";
    const NORMAL_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) Firefox/130.0";

    #[derive(Default)]
    struct RecordingNavigator {
        opened: Vec<String>,
    }

    impl Navigator for RecordingNavigator {
        fn open_in_new_tab(&mut self, url: &str) {
            self.opened.push(url.to_string());
        }
    }

    struct FailingClipboard;

    impl ClipboardBackend for FailingClipboard {
        fn write_text(&mut self, _text: &str) -> Result<(), String> {
            Err("denied".to_string())
        }
    }

    struct WorkingClipboard {
        wrote: Option<String>,
    }

    impl ClipboardBackend for WorkingClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), String> {
            self.wrote = Some(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeSurface {
        exec_succeeds: bool,
        live_scratches: Vec<ScratchId>,
        inserted: usize,
        removed: usize,
    }

    impl ScratchSurface for FakeSurface {
        fn insert_scratch(&mut self, _text: &str) -> ScratchId {
            let id = ScratchId(self.inserted as u64);
            self.inserted += 1;
            self.live_scratches.push(id);
            id
        }

        fn exec_copy(&mut self, _id: ScratchId) -> bool {
            self.exec_succeeds
        }

        fn remove_scratch(&mut self, id: ScratchId) {
            self.live_scratches.retain(|live| *live != id);
            self.removed += 1;
        }
    }

    fn whitelist() -> Whitelist {
        Whitelist::default()
    }

    #[test]
    fn whitelisted_host_is_trusted() {
        assert!(is_trusted("https://mp.weixin.qq.com/s/x", &whitelist()));
    }

    #[test]
    fn unlisted_host_is_untrusted() {
        assert!(!is_trusted("https://evil.example.com/", &whitelist()));
    }

    #[test]
    fn unparseable_url_fails_closed() {
        assert!(!is_trusted("not a url", &whitelist()));
    }

    #[test]
    fn hostless_url_fails_closed() {
        assert!(!is_trusted("mailto:someone@qq.com", &whitelist()));
    }

    #[test]
    fn restricted_context_detected_case_insensitively() {
        assert!(HostContext::from_user_agent(RESTRICTED_UA).is_restricted());
        assert!(HostContext::from_user_agent("micromessenger/7.0").is_restricted());
        assert!(!HostContext::from_user_agent(NORMAL_UA).is_restricted());
    }

    #[test]
    fn trusted_link_in_restricted_context_opens_directly() {
        let mut dispatcher = LinkDispatcher::new();
        let mut nav = RecordingNavigator::default();
        let ctx = HostContext::from_user_agent(RESTRICTED_UA);
        dispatcher.request("https://weibo.com/studio", &ctx, &whitelist(), &mut nav);
        assert_eq!(dispatcher.state(), &DispatchState::Idle);
        assert_eq!(nav.opened, vec!["https://weibo.com/studio"]);
        assert!(!dispatcher.scroll_locked());
    }

    #[test]
    fn untrusted_link_in_normal_context_opens_directly() {
        let mut dispatcher = LinkDispatcher::new();
        let mut nav = RecordingNavigator::default();
        let ctx = HostContext::from_user_agent(NORMAL_UA);
        dispatcher.request("https://evil.example.com/", &ctx, &whitelist(), &mut nav);
        assert_eq!(dispatcher.state(), &DispatchState::Idle);
        assert_eq!(nav.opened.len(), 1);
    }

    #[test]
    fn untrusted_link_in_restricted_context_suspends() {
        let mut dispatcher = LinkDispatcher::new();
        let mut nav = RecordingNavigator::default();
        let ctx = HostContext::from_user_agent(RESTRICTED_UA);
        dispatcher.request("https://evil.example.com/", &ctx, &whitelist(), &mut nav);
        assert_eq!(dispatcher.pending_url(), Some("https://evil.example.com/"));
        assert!(dispatcher.scroll_locked());
        assert!(nav.opened.is_empty());
    }

    #[test]
    fn proceed_navigates_and_returns_to_idle() {
        let mut dispatcher = LinkDispatcher::new();
        let mut nav = RecordingNavigator::default();
        let ctx = HostContext::from_user_agent(RESTRICTED_UA);
        dispatcher.request("https://evil.example.com/", &ctx, &whitelist(), &mut nav);
        dispatcher.proceed(&mut nav);
        assert_eq!(dispatcher.state(), &DispatchState::Idle);
        assert!(!dispatcher.scroll_locked());
        assert_eq!(nav.opened, vec!["https://evil.example.com/"]);
    }

    #[test]
    fn close_discards_without_navigating() {
        let mut dispatcher = LinkDispatcher::new();
        let mut nav = RecordingNavigator::default();
        let ctx = HostContext::from_user_agent(RESTRICTED_UA);
        dispatcher.request("https://evil.example.com/", &ctx, &whitelist(), &mut nav);
        dispatcher.close();
        assert_eq!(dispatcher.state(), &DispatchState::Idle);
        assert!(!dispatcher.scroll_locked());
        assert!(nav.opened.is_empty());
    }

    #[test]
    fn reentrant_request_overwrites_pending_url() {
        let mut dispatcher = LinkDispatcher::new();
        let mut nav = RecordingNavigator::default();
        let ctx = HostContext::from_user_agent(RESTRICTED_UA);
        dispatcher.request("https://first.example.com/", &ctx, &whitelist(), &mut nav);
        dispatcher.request("https://second.example.com/", &ctx, &whitelist(), &mut nav);
        assert_eq!(dispatcher.pending_url(), Some("https://second.example.com/"));
        assert!(dispatcher.scroll_locked());
        assert!(nav.opened.is_empty());
    }

    #[test]
    fn copy_link_success_shows_copied_toast_and_keeps_confirmation_open() {
        let mut dispatcher = LinkDispatcher::new();
        let mut nav = RecordingNavigator::default();
        let ctx = HostContext::from_user_agent(RESTRICTED_UA);
        dispatcher.request("https://evil.example.com/", &ctx, &whitelist(), &mut nav);

        let mut clipboard = ClipboardService::new(
            WorkingClipboard { wrote: None },
            FakeSurface::default(),
        );
        let mut toasts = NotificationCenter::new();
        let text = ToastText::default();
        dispatcher.copy_link(&mut clipboard, &mut toasts, &text, Instant::now());
        assert_eq!(toasts.message(), Some(text.link_copied.as_str()));
        assert_eq!(
            clipboard.primary.wrote.as_deref(),
            Some("https://evil.example.com/")
        );
        assert!(matches!(dispatcher.state(), DispatchState::ConfirmPending(_)));
    }

    #[test]
    fn copy_link_total_failure_shows_failure_toast() {
        let mut dispatcher = LinkDispatcher::new();
        let mut nav = RecordingNavigator::default();
        let ctx = HostContext::from_user_agent(RESTRICTED_UA);
        dispatcher.request("https://evil.example.com/", &ctx, &whitelist(), &mut nav);

        let mut clipboard = ClipboardService::new(FailingClipboard, FakeSurface::default());
        let mut toasts = NotificationCenter::new();
        let text = ToastText::default();
        dispatcher.copy_link(&mut clipboard, &mut toasts, &text, Instant::now());
        assert_eq!(toasts.message(), Some(text.copy_failed.as_str()));
    }

    #[test]
    fn fallback_copy_succeeds_and_cleans_up() {
        let surface = FakeSurface {
            exec_succeeds: true,
            ..FakeSurface::default()
        };
        let mut clipboard = ClipboardService::new(FailingClipboard, surface);
        let outcome = clipboard.copy("https://example.com/").unwrap();
        assert_eq!(outcome, CopyPath::Fallback);
        assert!(clipboard.surface.live_scratches.is_empty());
        assert_eq!(clipboard.surface.removed, 1);
    }

    #[test]
    fn fallback_copy_failure_still_cleans_up() {
        let mut clipboard = ClipboardService::new(FailingClipboard, FakeSurface::default());
        let err = clipboard.copy("https://example.com/").unwrap_err();
        assert!(matches!(err, RosterError::Clipboard(_)));
        assert!(clipboard.surface.live_scratches.is_empty());
        assert_eq!(clipboard.surface.removed, 1);
    }

    #[test]
    fn toast_expires_only_after_deadline() {
        let mut toasts = NotificationCenter::new();
        let start = Instant::now();
        toasts.show("copied", start);
        toasts.expire_due(start + TOAST_DURATION / 2);
        assert!(toasts.is_visible());
        toasts.expire_due(start + TOAST_DURATION);
        assert!(!toasts.is_visible());
    }

    #[test]
    fn reshow_restarts_the_expiry_deadline() {
        let mut toasts = NotificationCenter::new();
        let start = Instant::now();
        toasts.show("first", start);
        let later = start + TOAST_DURATION / 2;
        toasts.show("second", later);
        toasts.expire_due(start + TOAST_DURATION);
        assert_eq!(toasts.message(), Some("second"));
        toasts.expire_due(later + TOAST_DURATION);
        assert!(!toasts.is_visible());
    }

    #[test]
    fn copy_contact_success_shows_channel_toast() {
        let entry = ContactEntry {
            label: "WeChat".to_string(),
            value: "NerunOfficial".to_string(),
            copied_toast: Some("WeChat ID copied".to_string()),
        };
        let mut clipboard = ClipboardService::new(
            WorkingClipboard { wrote: None },
            FakeSurface::default(),
        );
        let mut toasts = NotificationCenter::new();
        let text = ToastText::default();
        copy_contact(&entry, &mut clipboard, &mut toasts, &text, Instant::now());
        assert_eq!(toasts.message(), Some("WeChat ID copied"));
        assert_eq!(clipboard.primary.wrote.as_deref(), Some("NerunOfficial"));
    }

    #[test]
    fn copy_contact_without_channel_toast_uses_generic_message() {
        let entry = ContactEntry {
            label: "QQ".to_string(),
            value: "12345678".to_string(),
            copied_toast: None,
        };
        let mut clipboard = ClipboardService::new(
            WorkingClipboard { wrote: None },
            FakeSurface::default(),
        );
        let mut toasts = NotificationCenter::new();
        let text = ToastText::default();
        copy_contact(&entry, &mut clipboard, &mut toasts, &text, Instant::now());
        assert_eq!(toasts.message(), Some(text.contact_copied.as_str()));
    }

    #[test]
    fn copy_contact_total_failure_shows_failure_toast() {
        let entry = ContactEntry {
            label: "Email".to_string(),
            value: "studio@example.com".to_string(),
            copied_toast: Some("Email copied".to_string()),
        };
        let mut clipboard = ClipboardService::new(FailingClipboard, FakeSurface::default());
        let mut toasts = NotificationCenter::new();
        let text = ToastText::default();
        copy_contact(&entry, &mut clipboard, &mut toasts, &text, Instant::now());
        assert_eq!(toasts.message(), Some(text.copy_failed.as_str()));
    }

    #[test]
    fn chooser_with_no_links_only_toasts() {
        let mut chooser = HomepageChooser::new();
        let mut toasts = NotificationCenter::new();
        let text = ToastText::default();
        chooser.open(&[], "Aki", None, &mut toasts, &text, Instant::now());
        assert!(!chooser.is_open());
        assert!(!chooser.scroll_locked());
        assert_eq!(toasts.message(), Some(text.no_homepage.as_str()));
    }

    #[test]
    fn chooser_open_locks_scroll_until_closed() {
        let links = vec![
            MemberLink {
                label: "Blog".to_string(),
                url: "https://blog.example.com/".to_string(),
            },
            MemberLink {
                label: "Weibo".to_string(),
                url: "https://weibo.com/aki".to_string(),
            },
        ];
        let mut chooser = HomepageChooser::new();
        let mut toasts = NotificationCenter::new();
        let text = ToastText::default();
        chooser.open(&links, "Aki", None, &mut toasts, &text, Instant::now());
        assert!(chooser.scroll_locked());
        chooser.close();
        assert!(!chooser.scroll_locked());
    }

    #[test]
    fn chooser_choose_delegates_then_closes() {
        let links = vec![
            MemberLink {
                label: "Blog".to_string(),
                url: "https://blog.example.com/".to_string(),
            },
            MemberLink {
                label: "Weibo".to_string(),
                url: "https://weibo.com/aki".to_string(),
            },
        ];
        let mut chooser = HomepageChooser::new();
        let mut toasts = NotificationCenter::new();
        let text = ToastText::default();
        chooser.open(&links, "Aki", Some("aki.png"), &mut toasts, &text, Instant::now());
        assert!(chooser.is_open());
        assert_eq!(chooser.member_name(), "Aki");

        let mut dispatcher = LinkDispatcher::new();
        let mut nav = RecordingNavigator::default();
        let ctx = HostContext::from_user_agent(RESTRICTED_UA);
        chooser.choose(
            "https://blog.example.com/",
            &mut dispatcher,
            &ctx,
            &whitelist(),
            &mut nav,
        );
        // Chooser closes synchronously; the delegated confirmation stays open.
        assert!(!chooser.is_open());
        assert!(matches!(dispatcher.state(), DispatchState::ConfirmPending(_)));
    }

    #[test]
    fn single_link_bypasses_the_chooser() {
        let links = vec![MemberLink {
            label: "Weibo".to_string(),
            url: "https://weibo.com/aki".to_string(),
        }];
        let mut chooser = HomepageChooser::new();
        let mut dispatcher = LinkDispatcher::new();
        let mut nav = RecordingNavigator::default();
        let mut toasts = NotificationCenter::new();
        let text = ToastText::default();
        let ctx = HostContext::from_user_agent(RESTRICTED_UA);
        dispatch_homepage(
            &links,
            "Aki",
            None,
            &mut chooser,
            &mut dispatcher,
            &ctx,
            &whitelist(),
            &mut nav,
            &mut toasts,
            &text,
            Instant::now(),
        );
        assert!(!chooser.is_open());
        assert_eq!(nav.opened, vec!["https://weibo.com/aki"]);
    }
}
