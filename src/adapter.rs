//! Provider adapters behind one exchange/fetch contract.
//!
//! Each supported platform has its own adapter type. [`Adapter`] is the closed set of those
//! types; the registry hands it out and callers drive it through [`IdentityProvider`] without
//! knowing which platform sits behind it.

pub mod alipay;
pub mod baidu;
pub mod bilibili;
pub mod common;
pub mod dingtalk;
pub mod douyin;
pub mod gitee;
pub mod github;
pub mod gitlab;
pub mod qq;
pub mod wechat;
pub mod wechat_mini_program;
pub mod wecom;
pub mod wecom_internal;
pub mod weibo;

pub use alipay::AlipayAdapter;
pub use baidu::BaiduAdapter;
pub use bilibili::BilibiliAdapter;
pub use common::AdapterContext;
pub use dingtalk::DingTalkAdapter;
pub use douyin::DouyinAdapter;
pub use gitee::GiteeAdapter;
pub use github::GitHubAdapter;
pub use gitlab::GitLabAdapter;
pub use qq::QqAdapter;
pub use wechat::{SCAN_ARTIFACT_PREFIX, ScanSession, WeChatAdapter};
pub use wechat_mini_program::WeChatMiniProgramAdapter;
pub use wecom::WeComAdapter;
pub use wecom_internal::WeComInternalAdapter;
pub use weibo::WeiboAdapter;

// self
use crate::{
	_prelude::*,
	auth::{Credential, Identity},
	http::HttpTransport,
	obs::{CallSpan, Operation},
	provider::ProviderKind,
	scan::ScanTicketCache,
};

/// Boxed future returned by [`IdentityProvider`] methods.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Capability set shared by every provider adapter.
pub trait IdentityProvider
where
	Self: Send + Sync,
{
	/// Provider kind implemented by this adapter.
	fn kind(&self) -> ProviderKind;

	/// Redeems a login artifact (authorization code, JS code, or scan artifact) for a
	/// [`Credential`].
	fn exchange_credential<'a>(&'a self, artifact: &'a str) -> ProviderFuture<'a, Credential>;

	/// Resolves the [`Identity`] behind a credential produced by
	/// [`exchange_credential`](Self::exchange_credential).
	fn fetch_identity<'a>(&'a self, credential: &'a Credential) -> ProviderFuture<'a, Identity>;

	/// Replaces the transport used for every subsequent call.
	fn set_transport(&mut self, transport: Arc<dyn HttpTransport>);
}

macro_rules! dispatch {
	($self:expr, $adapter:ident => $body:expr) => {
		match $self {
			Adapter::WeChat($adapter) => $body,
			Adapter::WeChatMiniProgram($adapter) => $body,
			Adapter::WeCom($adapter) => $body,
			Adapter::WeComInternal($adapter) => $body,
			Adapter::DingTalk($adapter) => $body,
			Adapter::Alipay($adapter) => $body,
			Adapter::Qq($adapter) => $body,
			Adapter::Baidu($adapter) => $body,
			Adapter::Bilibili($adapter) => $body,
			Adapter::Douyin($adapter) => $body,
			Adapter::Weibo($adapter) => $body,
			Adapter::GitHub($adapter) => $body,
			Adapter::Gitee($adapter) => $body,
			Adapter::GitLab($adapter) => $body,
		}
	};
}

/// Closed set of provider adapters.
#[derive(Debug)]
pub enum Adapter {
	/// WeChat website login and official-account scan login.
	WeChat(WeChatAdapter),
	/// WeChat mini program `jscode2session` login.
	WeChatMiniProgram(WeChatMiniProgramAdapter),
	/// WeCom third-party application login.
	WeCom(WeComAdapter),
	/// WeCom self-built (internal) application login.
	WeComInternal(WeComInternalAdapter),
	/// DingTalk login with organization directory enrichment.
	DingTalk(DingTalkAdapter),
	/// Alipay login through the signed open gateway.
	Alipay(AlipayAdapter),
	/// QQ Connect login.
	Qq(QqAdapter),
	/// Baidu account login.
	Baidu(BaiduAdapter),
	/// Bilibili open platform login.
	Bilibili(BilibiliAdapter),
	/// Douyin open platform login.
	Douyin(DouyinAdapter),
	/// Sina Weibo login.
	Weibo(WeiboAdapter),
	/// GitHub OAuth app login.
	GitHub(GitHubAdapter),
	/// Gitee OAuth login.
	Gitee(GiteeAdapter),
	/// GitLab OAuth login.
	GitLab(GitLabAdapter),
}
impl Adapter {
	/// Builds the adapter matching `ctx.kind()`.
	///
	/// Only the WeChat adapter uses `scan_cache`; the others ignore it.
	pub fn new(ctx: AdapterContext, scan_cache: Option<Arc<ScanTicketCache>>) -> Self {
		match ctx.kind() {
			ProviderKind::WeChat => Self::WeChat(WeChatAdapter::new(ctx, scan_cache)),
			ProviderKind::WeChatMiniProgram =>
				Self::WeChatMiniProgram(WeChatMiniProgramAdapter::new(ctx)),
			ProviderKind::WeCom => Self::WeCom(WeComAdapter::new(ctx)),
			ProviderKind::WeComInternal => Self::WeComInternal(WeComInternalAdapter::new(ctx)),
			ProviderKind::DingTalk => Self::DingTalk(DingTalkAdapter::new(ctx)),
			ProviderKind::Alipay => Self::Alipay(AlipayAdapter::new(ctx)),
			ProviderKind::Qq => Self::Qq(QqAdapter::new(ctx)),
			ProviderKind::Baidu => Self::Baidu(BaiduAdapter::new(ctx)),
			ProviderKind::Bilibili => Self::Bilibili(BilibiliAdapter::new(ctx)),
			ProviderKind::Douyin => Self::Douyin(DouyinAdapter::new(ctx)),
			ProviderKind::Weibo => Self::Weibo(WeiboAdapter::new(ctx)),
			ProviderKind::GitHub => Self::GitHub(GitHubAdapter::new(ctx)),
			ProviderKind::Gitee => Self::Gitee(GiteeAdapter::new(ctx)),
			ProviderKind::GitLab => Self::GitLab(GitLabAdapter::new(ctx)),
		}
	}

	/// Shared context of the wrapped adapter.
	pub fn context(&self) -> &AdapterContext {
		dispatch!(self, adapter => adapter.context())
	}

	/// Returns the WeChat adapter, which also drives scan login.
	pub fn as_wechat(&self) -> Option<&WeChatAdapter> {
		match self {
			Self::WeChat(adapter) => Some(adapter),
			_ => None,
		}
	}

	fn context_mut(&mut self) -> &mut AdapterContext {
		dispatch!(self, adapter => adapter.context_mut())
	}
}
impl IdentityProvider for Adapter {
	fn kind(&self) -> ProviderKind {
		self.context().kind()
	}

	fn exchange_credential<'a>(&'a self, artifact: &'a str) -> ProviderFuture<'a, Credential> {
		let span = CallSpan::new(self.kind().as_str(), Operation::ExchangeCredential);

		Box::pin(span.observe_async(async move {
			dispatch!(self, adapter => adapter.exchange_credential(artifact).await)
		}))
	}

	fn fetch_identity<'a>(&'a self, credential: &'a Credential) -> ProviderFuture<'a, Identity> {
		let span = CallSpan::new(self.kind().as_str(), Operation::FetchIdentity);

		Box::pin(span.observe_async(async move {
			dispatch!(self, adapter => adapter.fetch_identity(credential).await)
		}))
	}

	fn set_transport(&mut self, transport: Arc<dyn HttpTransport>) {
		self.context_mut().set_transport(transport);
	}
}

/// Declares a stateless adapter that only carries an [`AdapterContext`].
macro_rules! context_adapter {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Clone, Debug)]
		pub struct $name {
			ctx: $crate::adapter::AdapterContext,
		}
		impl $name {
			/// Wraps the shared adapter context.
			pub fn new(ctx: $crate::adapter::AdapterContext) -> Self {
				Self { ctx }
			}

			/// Shared adapter context.
			pub fn context(&self) -> &$crate::adapter::AdapterContext {
				&self.ctx
			}

			pub(crate) fn context_mut(&mut self) -> &mut $crate::adapter::AdapterContext {
				&mut self.ctx
			}
		}
	};
}
pub(crate) use context_adapter;

/// Fails with [`ConfigError::CredentialMismatch`](crate::error::ConfigError) for a credential
/// produced by another adapter.
pub(crate) fn mismatch(kind: ProviderKind, expected: &'static str) -> Error {
	crate::error::ConfigError::CredentialMismatch { kind: kind.as_str(), expected }.into()
}
