//! Closed set of supported provider kinds.

// self
use crate::{_prelude::*, error::ConfigError};

/// Identity provider families with a bundled adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProviderKind {
	/// WeChat web login and official-account scan login.
	WeChat,
	/// WeChat mini program session login.
	WeChatMiniProgram,
	/// WeCom third-party (service provider) login.
	WeCom,
	/// WeCom internal corp application login.
	WeComInternal,
	/// DingTalk login with organization directory enrichment.
	DingTalk,
	/// Alipay login through the signed open gateway.
	Alipay,
	/// QQ Connect login.
	Qq,
	/// Baidu account login.
	Baidu,
	/// Bilibili open platform login.
	Bilibili,
	/// Douyin open platform login.
	Douyin,
	/// Weibo login.
	Weibo,
	/// GitHub OAuth app login.
	GitHub,
	/// Gitee login.
	Gitee,
	/// GitLab login.
	GitLab,
}
impl ProviderKind {
	/// Every supported kind, in registry order.
	pub const ALL: [ProviderKind; 14] = [
		ProviderKind::WeChat,
		ProviderKind::WeChatMiniProgram,
		ProviderKind::WeCom,
		ProviderKind::WeComInternal,
		ProviderKind::DingTalk,
		ProviderKind::Alipay,
		ProviderKind::Qq,
		ProviderKind::Baidu,
		ProviderKind::Bilibili,
		ProviderKind::Douyin,
		ProviderKind::Weibo,
		ProviderKind::GitHub,
		ProviderKind::Gitee,
		ProviderKind::GitLab,
	];

	/// Returns the canonical kind name.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderKind::WeChat => "WeChat",
			ProviderKind::WeChatMiniProgram => "WeChatMiniProgram",
			ProviderKind::WeCom => "WeCom",
			ProviderKind::WeComInternal => "WeComInternal",
			ProviderKind::DingTalk => "DingTalk",
			ProviderKind::Alipay => "Alipay",
			ProviderKind::Qq => "QQ",
			ProviderKind::Baidu => "Baidu",
			ProviderKind::Bilibili => "Bilibili",
			ProviderKind::Douyin => "Douyin",
			ProviderKind::Weibo => "Weibo",
			ProviderKind::GitHub => "GitHub",
			ProviderKind::Gitee => "Gitee",
			ProviderKind::GitLab => "GitLab",
		}
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ProviderKind {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let raw = s.trim();

		ProviderKind::ALL
			.into_iter()
			.find(|kind| kind.as_str().eq_ignore_ascii_case(raw))
			.ok_or_else(|| ConfigError::UnsupportedProviderKind { kind: raw.to_owned() })
	}
}
