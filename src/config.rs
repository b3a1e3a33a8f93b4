use url::Url;

pub const AAGUID: [u8; 16] = [
    0xc3, 0x7e, 0x5a, 0x91, 0x2d, 0x44, 0x4f, 0x0b, 0x9a, 0x61, 0x38, 0xe2, 0x00, 0x00, 0x00, 0x01,
];
pub const PRESENCE_TIMEOUT_SECS: u64 = 30;

#[derive(clap::Parser, Debug, Clone)]
#[command(name = "ceremonium", version, about = "Sign in to a passkey relying party")]
pub struct Config {
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Base URL of the relying party API.
    #[arg(long, default_value = "http://localhost:3000")]
    pub server: String,
    /// Identity to register or sign in as.
    #[arg(long)]
    pub identity: String,
    /// Origin reported in client data. Defaults to the server's origin.
    #[arg(long)]
    pub origin: Option<String>,
    /// Override the relying party id used when the server omits one.
    #[arg(long)]
    pub rp_id: Option<String>,
    #[arg(long, default_value = "pinentry")]
    pub pinentry: String,
    /// Seconds to wait for the presence dialog.
    #[arg(long, default_value_t = PRESENCE_TIMEOUT_SECS)]
    pub presence_timeout: u64,
    /// Confirm user presence without prompting.
    #[arg(long)]
    pub yes: bool,
}

impl Config {
    pub fn server_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.server)
    }

    pub fn origin_url(&self) -> Result<Url, url::ParseError> {
        match &self.origin {
            Some(origin) => Url::parse(origin),
            None => self.server_url(),
        }
    }
}
