//! Built-in descriptors for well-known providers.
//!
//! Presets are plain [`ProviderConfig`] values run through the same validation as
//! user-supplied configuration, so every provider difference stays data.

// self
use crate::{
	auth::ProviderId,
	provider::{
		CredentialPlacement, ProtocolVersion, ProviderConfig, ProviderDescriptor,
		ProviderDescriptorError,
	},
};

/// Names accepted by [`preset`].
pub const PRESET_NAMES: &[&str] = &[
	"amazon",
	"bitbucket",
	"discord",
	"eventbrite",
	"facebook",
	"flickr",
	"foursquare",
	"github",
	"gitlab",
	"google",
	"instagram",
	"lichess",
	"linkedin",
	"meetup",
	"microsoft",
	"odnoklassniki",
	"pinterest",
	"plurk",
	"slack",
	"strava",
	"todoist",
	"trello",
	"tumblr",
	"twitter",
	"vimeo",
	"vk",
	"yahoo",
	"yandex",
];

/// Returns the descriptor registered under `name`.
pub fn preset(name: &str) -> Result<ProviderDescriptor, ProviderDescriptorError> {
	let config = preset_config(name)
		.ok_or_else(|| ProviderDescriptorError::UnknownPreset { name: name.to_owned() })?;

	config.into_descriptor(ProviderId::new(name)?)
}

/// Returns the raw configuration behind a preset so callers can tweak it before
/// validation.
pub fn preset_config(name: &str) -> Option<ProviderConfig> {
	let config = match name {
		"flickr" => oauth1(
			"http://www.flickr.com/services/oauth/request_token",
			"http://www.flickr.com/services/oauth/authorize",
			"http://www.flickr.com/services/oauth/access_token",
			"https://api.flickr.com/",
			Some(
				"http://api.flickr.com/services/rest?method=flickr.test.login&format=json&nojsoncallback=1",
			),
		),
		"meetup" => oauth1(
			"https://api.meetup.com/oauth/request/",
			"http://www.meetup.com/authorize/",
			"https://api.meetup.com/oauth/access/",
			"https://api.meetup.com/2/",
			None,
		),
		"plurk" => oauth1(
			"http://www.plurk.com/OAuth/request_token",
			"http://www.plurk.com/OAuth/authorize",
			"http://www.plurk.com/OAuth/access_token",
			"http://www.plurk.com/APP/",
			Some("http://www.plurk.com/APP/Profile/getOwnProfile"),
		),
		"trello" => oauth1(
			"https://trello.com/1/OAuthGetRequestToken",
			"https://trello.com/1/authorize",
			"https://trello.com/1/OAuthGetAccessToken",
			"https://api.trello.com/1/",
			Some("https://api.trello.com/1/members/me/"),
		),
		"tumblr" => oauth1(
			"http://www.tumblr.com/oauth/request_token",
			"http://www.tumblr.com/oauth/authorize",
			"http://www.tumblr.com/oauth/access_token",
			"https://api.tumblr.com/v2/",
			Some("http://api.tumblr.com/v2/user/info"),
		),
		"twitter" => oauth1(
			"https://api.twitter.com/oauth/request_token",
			"https://api.twitter.com/oauth/authorize",
			"https://api.twitter.com/oauth/access_token",
			"https://api.twitter.com/1.1/",
			Some("https://api.twitter.com/1.1/account/verify_credentials.json"),
		),
		"vimeo" => oauth1(
			"https://vimeo.com/oauth/request_token",
			"https://vimeo.com/oauth/authorize",
			"https://vimeo.com/oauth/access_token",
			"https://vimeo.com/api/rest/v2/",
			Some("http://vimeo.com/api/rest/v2?format=json&method=vimeo.oauth.checkAccessToken"),
		),
		"yahoo" => oauth1(
			"https://api.login.yahoo.com/oauth/v2/get_request_token",
			"https://api.login.yahoo.com/oauth/v2/request_auth",
			"https://api.login.yahoo.com/oauth/v2/get_token",
			"https://query.yahooapis.com/v1/",
			Some(
				"https://query.yahooapis.com/v1/yql?q=select%20*%20from%20social.profile%20where%20guid%3Dme%3B&format=json",
			),
		),
		"amazon" => oauth2(
			"https://www.amazon.com/ap/oa",
			"https://api.amazon.com/auth/o2/token",
			"https://api.amazon.com/",
			Some("https://api.amazon.com/user/profile"),
		),
		"bitbucket" => oauth2(
			"https://bitbucket.org/site/oauth2/authorize",
			"https://bitbucket.org/site/oauth2/access_token",
			"https://api.bitbucket.org/2.0/",
			Some("https://api.bitbucket.org/2.0/user"),
		),
		"discord" => oauth2(
			"https://discordapp.com/api/oauth2/authorize",
			"https://discordapp.com/api/oauth2/token",
			"https://discordapp.com/api/v6/",
			Some("https://discordapp.com/api/v6/users/@me"),
		),
		"eventbrite" => oauth2(
			"https://www.eventbrite.com/oauth/authorize",
			"https://www.eventbrite.com/oauth/token",
			"https://www.eventbriteapi.com/v3/",
			Some("https://www.eventbriteapi.com/v3/users/me"),
		),
		"facebook" => ProviderConfig {
			scope_separator: Some(",".into()),
			..oauth2(
				"https://www.facebook.com/dialog/oauth",
				"https://graph.facebook.com/oauth/access_token",
				"https://graph.facebook.com/v2.4/",
				Some("https://graph.facebook.com/me"),
			)
		},
		"foursquare" => ProviderConfig {
			credential_placement: Some(CredentialPlacement::Query),
			access_token_param: Some("oauth_token".into()),
			..oauth2(
				"https://foursquare.com/oauth2/authenticate",
				"https://foursquare.com/oauth2/access_token",
				"https://api.foursquare.com/v2/",
				Some("https://api.foursquare.com/v2/users/self"),
			)
		},
		"github" => oauth2(
			"https://github.com/login/oauth/authorize",
			"https://github.com/login/oauth/access_token",
			"https://api.github.com/",
			Some("https://api.github.com/user"),
		),
		"gitlab" => oauth2(
			"https://gitlab.com/oauth/authorize",
			"https://gitlab.com/oauth/token",
			"https://gitlab.com/api/v4/",
			Some("https://gitlab.com/api/v4/user"),
		),
		"google" => oauth2(
			"https://accounts.google.com/o/oauth2/v2/auth",
			"https://oauth2.googleapis.com/token",
			"https://www.googleapis.com/userinfo/v2/",
			Some("https://www.googleapis.com/userinfo/v2/me"),
		),
		"instagram" => oauth2(
			"https://api.instagram.com/oauth/authorize",
			"https://api.instagram.com/oauth/access_token",
			"https://api.instagram.com/v1/",
			Some("https://api.instagram.com/v1/users/self"),
		),
		"lichess" => oauth2(
			"https://oauth.lichess.org/oauth/authorize",
			"https://oauth.lichess.org/oauth",
			"https://lichess.org/",
			Some("https://lichess.org/api/account"),
		),
		"linkedin" => ProviderConfig {
			credential_placement: Some(CredentialPlacement::Query),
			access_token_param: Some("oauth2_access_token".into()),
			..oauth2(
				"https://www.linkedin.com/oauth/v2/authorization",
				"https://www.linkedin.com/oauth/v2/accessToken",
				"https://api.linkedin.com/v2/",
				Some("https://api.linkedin.com/v2/me"),
			)
		},
		"microsoft" => oauth2(
			"https://login.microsoftonline.com/common/oauth2/v2.0/authorize",
			"https://login.microsoftonline.com/common/oauth2/v2.0/token",
			"https://graph.microsoft.com/v1.0/",
			Some("https://graph.microsoft.com/v1.0/me"),
		),
		"odnoklassniki" => ProviderConfig {
			default_scopes: Some(vec!["offline".into()]),
			..oauth2(
				"https://connect.ok.ru/oauth/authorize",
				"https://api.odnoklassniki.ru/oauth/token.do",
				"https://api.ok.ru/",
				Some(
					"http://api.ok.ru/api/users/getCurrentUser?fields=uid,first_name,last_name,gender,city,country,pic128max",
				),
			)
		},
		"pinterest" => oauth2(
			"https://api.pinterest.com/oauth/",
			"https://api.pinterest.com/v1/oauth/token",
			"https://api.pinterest.com/v1/",
			Some("https://api.pinterest.com/v1/me/"),
		),
		"slack" => ProviderConfig {
			scope_separator: Some(",".into()),
			..oauth2(
				"https://slack.com/oauth/v2/authorize",
				"https://slack.com/api/oauth.v2.access",
				"https://slack.com/api/",
				Some("https://slack.com/api/users.profile.get"),
			)
		},
		"strava" => oauth2(
			"https://www.strava.com/oauth/authorize",
			"https://www.strava.com/oauth/token",
			"https://www.strava.com/api/v3/",
			None,
		),
		// The profile lives behind the sync endpoint, which expects `sync_token` and
		// `resource_types` from the caller.
		"todoist" => oauth2(
			"https://todoist.com/oauth/authorize",
			"https://todoist.com/oauth/access_token",
			"https://api.todoist.com/rest/v2/",
			Some("https://api.todoist.com/sync/v9/sync"),
		),
		"vk" => ProviderConfig {
			credential_placement: Some(CredentialPlacement::Query),
			scope_separator: Some(",".into()),
			default_scopes: Some(vec!["offline".into()]),
			..oauth2(
				"https://oauth.vk.com/authorize",
				"https://oauth.vk.com/access_token",
				"https://api.vk.com/method/",
				Some(
					"https://api.vk.com/method/getProfiles?fields=uid,first_name,last_name,nickname,sex,bdate,city,country,timezone,photo_big&v=5.9.2",
				),
			)
		},
		"yandex" => oauth2(
			"https://oauth.yandex.com/authorize",
			"https://oauth.yandex.com/token",
			"https://login.yandex.ru/",
			Some("https://login.yandex.ru/info"),
		),
		_ => return None,
	};

	Some(config)
}

fn oauth1(
	request_token: &str,
	authorize: &str,
	access_token: &str,
	base: &str,
	user_info: Option<&str>,
) -> ProviderConfig {
	ProviderConfig {
		request_token_url: Some(request_token.into()),
		authorize_url: Some(authorize.into()),
		access_token_url: Some(access_token.into()),
		base_url: Some(base.into()),
		user_info_url: user_info.map(Into::into),
		..ProviderConfig::new(ProtocolVersion::OAuth1)
	}
}

fn oauth2(
	authorize: &str,
	access_token: &str,
	base: &str,
	user_info: Option<&str>,
) -> ProviderConfig {
	ProviderConfig {
		authorize_url: Some(authorize.into()),
		access_token_url: Some(access_token.into()),
		base_url: Some(base.into()),
		user_info_url: user_info.map(Into::into),
		..ProviderConfig::new(ProtocolVersion::OAuth2)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn every_listed_preset_validates() {
		for name in PRESET_NAMES {
			let descriptor = preset(name).unwrap_or_else(|e| panic!("Preset `{name}` failed: {e}."));

			assert_eq!(descriptor.id.as_ref(), *name);

			if descriptor.version == ProtocolVersion::OAuth1 {
				assert!(descriptor.endpoints.request_token.is_some());
			}
			if !matches!(*name, "meetup" | "strava") {
				assert!(descriptor.endpoints.user_info.is_some(), "`{name}` lacks a profile URL.");
			}
		}

		assert!(PRESET_NAMES.windows(2).all(|pair| pair[0] < pair[1]));
	}

	#[test]
	fn offline_scope_is_the_default_where_required() {
		for name in ["vk", "odnoklassniki"] {
			let descriptor = preset(name).unwrap_or_else(|e| panic!("Preset `{name}` failed: {e}."));

			assert_eq!(descriptor.quirks.default_scopes, ["offline"]);
		}

		let github = preset("github").expect("GitHub preset should exist.");

		assert!(github.quirks.default_scopes.is_empty());
	}

	#[test]
	fn quirks_are_carried_as_data() {
		let linkedin = preset("linkedin").expect("LinkedIn preset should exist.");

		assert_eq!(linkedin.credential_placement, CredentialPlacement::Query);
		assert_eq!(linkedin.quirks.access_token_param, "oauth2_access_token");
		assert_eq!(preset("slack").expect("Slack preset should exist.").quirks.scope_separator, ",");
		assert_eq!(
			preset("twitter")
				.expect("Twitter preset should exist.")
				.resolve_url("statuses/home_timeline.json")
				.expect("Relative URL should resolve.")
				.as_str(),
			"https://api.twitter.com/1.1/statuses/home_timeline.json"
		);
		assert_eq!(
			preset("myspace"),
			Err(ProviderDescriptorError::UnknownPreset { name: "myspace".into() })
		);
	}
}
