use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Notify;
use tracing::{debug, warn};

use omnia_wallet_core::{
    OfflineSignerPort, PortError, ProviderKind, ProviderSet, WalletAccount, WalletProviderPort,
};

use crate::WalletAdapterConfig;

/// One Cosmos wallet extension (Keplr or Leap) behind the provider port.
#[derive(Debug, Clone)]
pub struct CosmosWalletAdapter {
    kind: ProviderKind,
    mode: ProviderMode,
}

#[derive(Debug, Clone)]
enum ProviderMode {
    Deterministic(Arc<Mutex<FixtureWallet>>),
    #[cfg(not(target_arch = "wasm32"))]
    Proxy(ProxyRuntime),
    #[cfg(target_arch = "wasm32")]
    Browser,
}

#[derive(Debug, Clone)]
#[cfg(not(target_arch = "wasm32"))]
struct ProxyRuntime {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug)]
struct FixtureWallet {
    accounts: Vec<WalletAccount>,
    authorized: bool,
    enabled_chains: Vec<String>,
    enable_requests: Vec<String>,
    enable_gate: Option<Arc<Notify>>,
}

impl FixtureWallet {
    fn for_kind(kind: ProviderKind) -> Self {
        let (address, key_byte) = match kind {
            ProviderKind::Keplr => ("cosmos1qypqxpq9qcrsszg2pvxq6rs0zqg3yyc5lzv7xu", 0x02),
            ProviderKind::Leap => ("cosmos1v9jxgu33p9vj2k6f2q7ry6ad4ll5u3wnl7yr7g", 0x03),
        };
        Self {
            accounts: vec![WalletAccount {
                address: address.to_owned(),
                algo: "secp256k1".to_owned(),
                pubkey: vec![key_byte; 33],
            }],
            authorized: true,
            enabled_chains: Vec::new(),
            enable_requests: Vec::new(),
            enable_gate: None,
        }
    }
}

/// Signing handle returned by `getOfflineSigner(chainId)`.
#[derive(Debug, Clone)]
pub struct CosmosOfflineSigner {
    kind: ProviderKind,
    chain_id: String,
    backend: SignerBackend,
}

#[derive(Debug, Clone)]
enum SignerBackend {
    Deterministic(Arc<Mutex<FixtureWallet>>),
    #[cfg(not(target_arch = "wasm32"))]
    Proxy(ProxyRuntime),
    #[cfg(target_arch = "wasm32")]
    Browser(wasm_bindgen::JsValue),
}

impl CosmosWalletAdapter {
    /// In-process fixture wallet with one account per kind.
    pub fn deterministic(kind: ProviderKind) -> Self {
        Self {
            kind,
            mode: ProviderMode::Deterministic(Arc::new(Mutex::new(FixtureWallet::for_kind(kind)))),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn proxy(kind: ProviderKind, base_url: &str, timeout_ms: u64) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| {
                PortError::Transport(format!("failed to build wallet proxy client: {e}"))
            })?;
        Ok(Self {
            kind,
            mode: ProviderMode::Proxy(ProxyRuntime {
                base_url: base_url.to_owned(),
                client,
            }),
        })
    }

    /// `None` when `window.<kind>` is not injected.
    #[cfg(target_arch = "wasm32")]
    pub fn browser(kind: ProviderKind) -> Option<Self> {
        browser_provider(kind).ok().map(|_| Self {
            kind,
            mode: ProviderMode::Browser,
        })
    }

    pub fn detect(kind: ProviderKind, config: &WalletAdapterConfig) -> Option<Self> {
        #[cfg(target_arch = "wasm32")]
        {
            let _ = config;
            Self::browser(kind)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(ref base_url) = config.proxy_url {
                return match Self::proxy(kind, base_url, config.proxy_timeout_ms) {
                    Ok(adapter) => Some(adapter),
                    Err(e) => {
                        warn!(wallet = %kind, error = %e, "wallet proxy unavailable");
                        None
                    }
                };
            }
            if config.strict_runtime_required() || !config.deterministic_wallets.contains(&kind) {
                return None;
            }
            Some(Self::deterministic(kind))
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self.mode {
            ProviderMode::Deterministic(_) => "deterministic",
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(_) => "proxy",
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => "browser",
        }
    }

    fn fixture(&self) -> Result<&Arc<Mutex<FixtureWallet>>, PortError> {
        match &self.mode {
            ProviderMode::Deterministic(wallet) => Ok(wallet),
            #[allow(unreachable_patterns)]
            _ => Err(PortError::NotImplemented(
                "debug hooks require the deterministic wallet",
            )),
        }
    }

    pub fn debug_set_accounts(&self, accounts: Vec<WalletAccount>) -> Result<(), PortError> {
        lock_fixture(self.fixture()?)?.accounts = accounts;
        Ok(())
    }

    /// Makes every following `enable` fail as if the user withdrew access.
    pub fn debug_revoke(&self) -> Result<(), PortError> {
        let mut g = lock_fixture(self.fixture()?)?;
        g.authorized = false;
        g.enabled_chains.clear();
        Ok(())
    }

    pub fn debug_authorize(&self) -> Result<(), PortError> {
        lock_fixture(self.fixture()?)?.authorized = true;
        Ok(())
    }

    /// Parks the next `enable` until the returned handle is notified.
    pub fn debug_hold_next_enable(&self) -> Result<Arc<Notify>, PortError> {
        let gate = Arc::new(Notify::new());
        lock_fixture(self.fixture()?)?.enable_gate = Some(Arc::clone(&gate));
        Ok(gate)
    }

    /// Chain ids passed to `enable`, in call order, including failed calls.
    pub fn debug_enable_requests(&self) -> Result<Vec<String>, PortError> {
        Ok(lock_fixture(self.fixture()?)?.enable_requests.clone())
    }
}

impl WalletProviderPort for CosmosWalletAdapter {
    type Signer = CosmosOfflineSigner;

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn enable(&self, chain_id: &str) -> Result<(), PortError> {
        debug!(wallet = %self.kind, mode = self.mode_name(), chain_id, "enable requested");
        match &self.mode {
            ProviderMode::Deterministic(wallet) => {
                let gate = {
                    let mut g = lock_fixture(wallet)?;
                    g.enable_requests.push(chain_id.to_owned());
                    g.enable_gate.take()
                };
                if let Some(gate) = gate {
                    gate.notified().await;
                }

                let mut g = lock_fixture(wallet)?;
                if !g.authorized {
                    return Err(PortError::Rejected(format!(
                        "{} request rejected by user",
                        self.kind
                    )));
                }
                if !g.enabled_chains.iter().any(|c| c == chain_id) {
                    g.enabled_chains.push(chain_id.to_owned());
                }
                Ok(())
            }
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(proxy) => {
                proxy.call("enable", self.kind, chain_id).await?;
                Ok(())
            }
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => {
                let provider = browser_provider(self.kind)?;
                let promise = call_method(
                    &provider,
                    "enable",
                    &[wasm_bindgen::JsValue::from_str(chain_id)],
                )?;
                await_promise(promise, "enable").await?;
                Ok(())
            }
        }
    }

    fn offline_signer(&self, chain_id: &str) -> Result<CosmosOfflineSigner, PortError> {
        let backend = match &self.mode {
            ProviderMode::Deterministic(wallet) => SignerBackend::Deterministic(Arc::clone(wallet)),
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(proxy) => SignerBackend::Proxy(proxy.clone()),
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => {
                let provider = browser_provider(self.kind)?;
                let handle = call_method(
                    &provider,
                    "getOfflineSigner",
                    &[wasm_bindgen::JsValue::from_str(chain_id)],
                )?;
                SignerBackend::Browser(handle)
            }
        };
        Ok(CosmosOfflineSigner {
            kind: self.kind,
            chain_id: chain_id.to_owned(),
            backend,
        })
    }
}

impl CosmosOfflineSigner {
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }
}

impl OfflineSignerPort for CosmosOfflineSigner {
    fn chain_id(&self) -> &str {
        &self.chain_id
    }

    async fn get_accounts(&self) -> Result<Vec<WalletAccount>, PortError> {
        match &self.backend {
            SignerBackend::Deterministic(wallet) => {
                let g = lock_fixture(wallet)?;
                if !g.enabled_chains.iter().any(|c| c == &self.chain_id) {
                    return Err(PortError::Rejected(format!(
                        "chain {} is not enabled in {}",
                        self.chain_id, self.kind
                    )));
                }
                Ok(g.accounts.clone())
            }
            #[cfg(not(target_arch = "wasm32"))]
            SignerBackend::Proxy(proxy) => {
                let result = proxy.call("getAccounts", self.kind, &self.chain_id).await?;
                serde_json::from_value(result)
                    .map_err(|e| PortError::Validation(format!("invalid accounts payload: {e}")))
            }
            #[cfg(target_arch = "wasm32")]
            SignerBackend::Browser(handle) => {
                let promise = call_method(handle, "getAccounts", &[])?;
                let value = await_promise(promise, "getAccounts").await?;
                js_accounts(value)
            }
        }
    }
}

/// Every wallet kind the runtime exposes.
pub fn detect_providers(config: &WalletAdapterConfig) -> ProviderSet<CosmosWalletAdapter> {
    let mut providers = ProviderSet::new();
    for kind in ProviderKind::ALL {
        match CosmosWalletAdapter::detect(kind, config) {
            Some(adapter) => {
                debug!(wallet = %kind, mode = adapter.mode_name(), "wallet provider detected");
                providers.insert(adapter);
            }
            None => debug!(wallet = %kind, "wallet provider not installed"),
        }
    }
    providers
}

fn lock_fixture(wallet: &Mutex<FixtureWallet>) -> Result<MutexGuard<'_, FixtureWallet>, PortError> {
    wallet
        .lock()
        .map_err(|e| PortError::Transport(format!("fixture wallet lock poisoned: {e}")))
}

#[cfg(not(target_arch = "wasm32"))]
impl ProxyRuntime {
    async fn call(
        &self,
        method: &str,
        kind: ProviderKind,
        chain_id: &str,
    ) -> Result<serde_json::Value, PortError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": {
                "wallet": kind.global_name(),
                "chainId": chain_id,
            },
        });
        let response = self
            .client
            .post(&self.base_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PortError::Transport(format!("wallet proxy request failed: {e}")))?;
        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PortError::Transport(format!("wallet proxy json decode failed: {e}")))?;
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "wallet proxy status {status}: {body}"
            )));
        }
        if let Some(err) = body.get("error") {
            return Err(PortError::Rejected(format!(
                "wallet proxy returned error: {err}"
            )));
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| PortError::Transport("wallet proxy missing result".to_owned()))
    }
}

#[cfg(target_arch = "wasm32")]
fn browser_provider(kind: ProviderKind) -> Result<wasm_bindgen::JsValue, PortError> {
    let window =
        web_sys::window().ok_or_else(|| PortError::Transport("missing window".to_owned()))?;
    let provider = get_prop(&window.into(), kind.global_name())?;
    if provider.is_null() || provider.is_undefined() {
        return Err(PortError::NotInstalled(format!(
            "window.{} missing",
            kind.global_name()
        )));
    }
    Ok(provider)
}

#[cfg(target_arch = "wasm32")]
fn get_prop(target: &wasm_bindgen::JsValue, key: &str) -> Result<wasm_bindgen::JsValue, PortError> {
    js_sys::Reflect::get(target, &wasm_bindgen::JsValue::from_str(key))
        .map_err(|e| PortError::Transport(format!("read provider property {key} failed: {e:?}")))
}

#[cfg(target_arch = "wasm32")]
fn call_method(
    target: &wasm_bindgen::JsValue,
    name: &str,
    args: &[wasm_bindgen::JsValue],
) -> Result<wasm_bindgen::JsValue, PortError> {
    use wasm_bindgen::JsCast;

    let function = get_prop(target, name)?
        .dyn_into::<js_sys::Function>()
        .map_err(|_| PortError::Validation(format!("provider {name} is not a function")))?;
    let args: js_sys::Array = args.iter().collect();
    js_sys::Reflect::apply(&function, target, &args)
        .map_err(|e| PortError::Rejected(format!("provider {name} threw: {e:?}")))
}

#[cfg(target_arch = "wasm32")]
async fn await_promise(
    value: wasm_bindgen::JsValue,
    what: &str,
) -> Result<wasm_bindgen::JsValue, PortError> {
    use wasm_bindgen::JsCast;

    let promise = value
        .dyn_into::<js_sys::Promise>()
        .map_err(|_| PortError::Transport(format!("provider {what} did not return Promise")))?;
    wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map_err(|e| PortError::Rejected(format!("provider {what} rejected: {e:?}")))
}

#[cfg(target_arch = "wasm32")]
fn js_accounts(value: wasm_bindgen::JsValue) -> Result<Vec<WalletAccount>, PortError> {
    if !js_sys::Array::is_array(&value) {
        return Err(PortError::Validation(
            "getAccounts must return an array".to_owned(),
        ));
    }
    let arr = js_sys::Array::from(&value);
    let mut accounts = Vec::with_capacity(arr.length() as usize);
    for item in arr.iter() {
        let address = get_prop(&item, "address")?
            .as_string()
            .ok_or_else(|| PortError::Validation("account address must be string".to_owned()))?;
        let algo = get_prop(&item, "algo")?.as_string().unwrap_or_default();
        let pubkey_js = get_prop(&item, "pubkey")?;
        let pubkey = if pubkey_js.is_null() || pubkey_js.is_undefined() {
            Vec::new()
        } else {
            js_sys::Uint8Array::new(&pubkey_js).to_vec()
        };
        accounts.push(WalletAccount {
            address,
            algo,
            pubkey,
        });
    }
    Ok(accounts)
}
