use url::Url;

#[derive(clap::ValueEnum, Clone, Debug, Copy)]
pub enum CargoEnv {
    Development,
    Production,
}

#[derive(clap::Parser, Debug, Clone)]
pub struct AppConfig {
    // production or development
    #[clap(long, env, value_enum, default_value = "development")]
    pub cargo_env: CargoEnv,

    // port that the app will bind to
    #[clap(long, env, default_value = "8080")]
    pub port: u16,

    // redis url for the cache, leave it out to keep everything in process memory
    #[clap(long, env)]
    pub redis_url: Option<String>,

    // base playlist that gets written before the generated channels
    #[clap(long, env)]
    pub m3u_base: Option<String>,

    // base xmltv document that the generated guide gets appended to
    #[clap(long, env)]
    pub epg_base: Option<String>,

    // where feed-new.json lives, clap refuses to start if this isn't a url
    #[clap(
        long = "json-tv-url",
        env = "JSONTVURL",
        default_value = "https://fast-guide.smoothstreams.tv/"
    )]
    pub json_tv_url: Url,

    #[clap(long, env, default_value = "")]
    pub username: String,

    #[clap(long, env, default_value = "")]
    pub password: String,

    #[clap(long, env, default_value = "https://auth.smoothstreams.tv/hash_api.php")]
    pub auth_url: String,

    #[clap(long, env, default_value = "viewss")]
    pub auth_site: String,

    // host the channel redirects point at
    #[clap(long, env, default_value = "deu-uk1.SmoothStreams.tv")]
    pub stream_host: String,

    // public url used for playlist links, falls back to the request Host header
    #[clap(long, env)]
    pub base_url: Option<String>,

    // look ruv streams up through the api instead of the static cdn template
    #[clap(long, env, action = clap::ArgAction::Set, default_value_t = false)]
    pub ruv_geoblocked: bool,

    #[clap(
        long,
        env,
        default_value = "http://ruv.is/sites/all/themes/at_ruv/scripts/ruv-stream.php?format=json"
    )]
    pub ruv_api_url: String,

    // {channel} gets replaced with the requested channel
    #[clap(
        long,
        env,
        default_value = "https://ruvruv-live.akamaized.net/streymi/{channel}/master.m3u8"
    )]
    pub ruv_cdn_template: String,

    // optional sentry integration
    #[clap(long, env)]
    pub sentry_dsn: Option<String>,
}

impl AppConfig {
    /// the schedule feed always lives at feed-new.json relative to the configured base
    pub fn feed_url(&self) -> anyhow::Result<Url> {
        Ok(self.json_tv_url.join("feed-new.json")?)
    }
}

impl Default for AppConfig {
    // mostly used by tests, the real values come from the env
    fn default() -> Self {
        Self {
            cargo_env: CargoEnv::Development,
            port: 8080,
            redis_url: None,
            m3u_base: None,
            epg_base: None,
            json_tv_url: Url::parse("https://fast-guide.smoothstreams.tv/")
                .expect("static default url should parse"),
            username: String::new(),
            password: String::new(),
            auth_url: "https://auth.smoothstreams.tv/hash_api.php".to_string(),
            auth_site: "viewss".to_string(),
            stream_host: "deu-uk1.SmoothStreams.tv".to_string(),
            base_url: None,
            ruv_geoblocked: false,
            ruv_api_url:
                "http://ruv.is/sites/all/themes/at_ruv/scripts/ruv-stream.php?format=json"
                    .to_string(),
            ruv_cdn_template: "https://ruvruv-live.akamaized.net/streymi/{channel}/master.m3u8"
                .to_string(),
            sentry_dsn: None,
        }
    }
}
