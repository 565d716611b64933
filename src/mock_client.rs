//! Mock ChainClient implementation for testing
//!
//! An automining in-memory chain that executes the SVG NFT contract surface
//! (`create`, `tokenURI`, `tokenCounter`, `ownerOf`) for any contract it
//! deploys, and counts every call made against it.

use crate::abi::{DynSolValue, Interface};
use crate::address::Address;
use crate::client::{ChainClient, ClientResult, Log, Receipt, TransactionRequest, TxHash};
use crate::error::ClientError;
use crate::metadata::{format_token_uri, svg_to_image_uri};
use crate::signer::SigningIdentity;
use alloy_dyn_abi::{FunctionExt, JsonAbiExt};
use alloy_json_abi::Function;
use alloy_primitives::{keccak256, B256, U256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const SURFACE_ABI: &str = r#"[
    {"type":"function","name":"create","inputs":[{"name":"svg","type":"string"}],
     "outputs":[],"stateMutability":"nonpayable"},
    {"type":"function","name":"tokenURI","inputs":[{"name":"tokenId","type":"uint256"}],
     "outputs":[{"name":"","type":"string"}],"stateMutability":"view"},
    {"type":"function","name":"tokenCounter","inputs":[],
     "outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
    {"type":"function","name":"ownerOf","inputs":[{"name":"tokenId","type":"uint256"}],
     "outputs":[{"name":"","type":"address"}],"stateMutability":"view"},
    {"type":"event","name":"Transfer","anonymous":false,"inputs":[
     {"name":"from","type":"address","indexed":true},
     {"name":"to","type":"address","indexed":true},
     {"name":"tokenId","type":"uint256","indexed":true}]},
    {"type":"event","name":"CreatedSVGNFT","anonymous":false,"inputs":[
     {"name":"tokenId","type":"uint256","indexed":true},
     {"name":"tokenURI","type":"string","indexed":false}]}
]"#;

/// Default chain id, matching a local Hardhat node
pub const MOCK_CHAIN_ID: u64 = 31337;

/// Number of calls made per [`ChainClient`] method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub chain_id: usize,
    pub block_number: usize,
    pub send_transaction: usize,
    pub transaction_receipt: usize,
    pub call: usize,
    pub code_at: usize,
}

impl CallCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.chain_id
            + self.block_number
            + self.send_transaction
            + self.transaction_receipt
            + self.call
            + self.code_at
    }
}

struct Surface {
    create: Function,
    token_uri: Function,
    token_counter: Function,
    owner_of: Function,
    transfer_topic: B256,
    created_topic: B256,
}

impl Surface {
    fn new() -> Self {
        let interface = Interface::from_json(SURFACE_ABI).expect("static ABI");
        let function = |name: &str| interface.function(name).expect("static function").clone();
        Self {
            create: function("create"),
            token_uri: function("tokenURI"),
            token_counter: function("tokenCounter"),
            owner_of: function("ownerOf"),
            transfer_topic: interface.event_topic("Transfer").expect("static event"),
            created_topic: interface.event_topic("CreatedSVGNFT").expect("static event"),
        }
    }
}

#[derive(Default)]
struct MockContract {
    code: Vec<u8>,
    owners: Vec<Address>,
    token_uris: Vec<String>,
}

/// Mock client for testing without a live node
#[derive(Clone)]
pub struct MockClient {
    inner: Arc<Mutex<MockClientInner>>,
}

struct MockClientInner {
    surface: Surface,
    chain_id: u64,
    block_number: u64,
    nonces: HashMap<Address, u64>,
    contracts: HashMap<Address, MockContract>,
    receipts: HashMap<TxHash, Receipt>,
    counts: CallCounts,
    reject_next: Option<String>,
    fail_next_call: Option<String>,
    revert_next: bool,
    withhold_receipts: bool,
    mine_on_poll: bool,
}

impl MockClient {
    /// Create a new mock client
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockClientInner {
                surface: Surface::new(),
                chain_id: MOCK_CHAIN_ID,
                block_number: 0,
                nonces: HashMap::new(),
                contracts: HashMap::new(),
                receipts: HashMap::new(),
                counts: CallCounts::default(),
                reject_next: None,
                fail_next_call: None,
                revert_next: false,
                withhold_receipts: false,
                mine_on_poll: false,
            })),
        }
    }

    /// Report a different chain id
    #[must_use]
    pub fn with_chain_id(self, chain_id: u64) -> Self {
        self.inner.lock().unwrap().chain_id = chain_id;
        self
    }

    /// Make the next `send_transaction` fail with an RPC error
    pub fn reject_next_send(&self, message: &str) {
        self.inner.lock().unwrap().reject_next = Some(message.to_string());
    }

    /// Make the next `call` fail with an RPC error
    pub fn fail_next_call(&self, message: &str) {
        self.inner.lock().unwrap().fail_next_call = Some(message.to_string());
    }

    /// Make the next transaction mine with a failed status
    pub fn revert_next_send(&self) {
        self.inner.lock().unwrap().revert_next = true;
    }

    /// Never return receipts for subsequently sent transactions
    pub fn withhold_receipts(&self, withhold: bool) {
        self.inner.lock().unwrap().withhold_receipts = withhold;
    }

    /// Mine an empty block on every receipt poll (interval mining)
    pub fn mine_on_poll(&self, enabled: bool) {
        self.inner.lock().unwrap().mine_on_poll = enabled;
    }

    /// Mine `count` empty blocks
    pub fn mine(&self, count: u64) {
        self.inner.lock().unwrap().block_number += count;
    }

    /// Forget all deployed contracts, as after a node restart
    pub fn wipe_contracts(&self) {
        self.inner.lock().unwrap().contracts.clear();
    }

    #[must_use]
    pub fn calls(&self) -> CallCounts {
        self.inner.lock().unwrap().counts
    }

    /// Tokens minted so far by the contract at `address`
    #[must_use]
    pub fn token_count(&self, address: &Address) -> usize {
        self.inner
            .lock()
            .unwrap()
            .contracts
            .get(address)
            .map_or(0, |c| c.token_uris.len())
    }

    /// Contracts deployed and still present
    #[must_use]
    pub fn contract_count(&self) -> usize {
        self.inner.lock().unwrap().contracts.len()
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

fn reverted(message: &str) -> ClientError {
    ClientError::Rpc {
        code: 3,
        message: format!("execution reverted: {message}"),
    }
}

fn uint_topic(value: usize) -> B256 {
    B256::from(U256::from(value).to_be_bytes::<32>())
}

/// Arguments of `function` if `data` starts with its selector
fn decode_call(function: &Function, data: &[u8]) -> Option<Vec<DynSolValue>> {
    let args = data.strip_prefix(function.selector().as_slice())?;
    function.abi_decode_input(args).ok()
}

impl MockClientInner {
    /// Run a state-changing call; `None` means the call reverted
    fn execute(&mut self, from: Address, to: Address, data: &[u8]) -> Option<Vec<Log>> {
        let Some(contract) = self.contracts.get_mut(&to) else {
            // plain value transfer to an account without code
            return Some(Vec::new());
        };
        let args = decode_call(&self.surface.create, data)?;
        let svg = args.first()?.as_str()?;

        let token_id = contract.token_uris.len();
        let uri = format_token_uri(&svg_to_image_uri(svg));
        contract.owners.push(from);
        contract.token_uris.push(uri.clone());

        let created_data = DynSolValue::String(uri).abi_encode();
        Some(vec![
            Log::new_unchecked(
                to,
                vec![
                    self.surface.transfer_topic,
                    Address::ZERO.into_word(),
                    from.into_word(),
                    uint_topic(token_id),
                ],
                Default::default(),
            ),
            Log::new_unchecked(
                to,
                vec![self.surface.created_topic, uint_topic(token_id)],
                created_data.into(),
            ),
        ])
    }

    fn read(&self, to: &Address, data: &[u8]) -> ClientResult<Vec<u8>> {
        let Some(contract) = self.contracts.get(to) else {
            return Ok(Vec::new());
        };
        let surface = &self.surface;
        let token_index = |function: &Function| -> ClientResult<usize> {
            decode_call(function, data)
                .and_then(|args| args.first().and_then(DynSolValue::as_uint))
                .and_then(|(id, _)| usize::try_from(id).ok())
                .filter(|id| *id < contract.token_uris.len())
                .ok_or_else(|| reverted("ERC721: invalid token ID"))
        };
        let encode = |function: &Function, value: DynSolValue| {
            function
                .abi_encode_output(&[value])
                .map_err(|e| ClientError::InvalidResponse(e.to_string()))
        };

        if data.starts_with(surface.token_uri.selector().as_slice()) {
            let id = token_index(&surface.token_uri)?;
            let uri = DynSolValue::String(contract.token_uris[id].clone());
            encode(&surface.token_uri, uri)
        } else if data.starts_with(surface.owner_of.selector().as_slice()) {
            let id = token_index(&surface.owner_of)?;
            encode(&surface.owner_of, DynSolValue::Address(contract.owners[id]))
        } else if data.starts_with(surface.token_counter.selector().as_slice()) {
            let count = U256::from(contract.token_uris.len());
            encode(&surface.token_counter, DynSolValue::Uint(count, 256))
        } else {
            Err(reverted("unknown selector"))
        }
    }
}

impl ChainClient for MockClient {
    fn chain_id(&self) -> ClientResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        inner.counts.chain_id += 1;
        Ok(inner.chain_id)
    }

    fn block_number(&self) -> ClientResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        inner.counts.block_number += 1;
        Ok(inner.block_number)
    }

    fn send_transaction(
        &self,
        from: &SigningIdentity,
        tx: &TransactionRequest,
    ) -> ClientResult<TxHash> {
        let mut inner = self.inner.lock().unwrap();
        inner.counts.send_transaction += 1;

        if let Some(message) = inner.reject_next.take() {
            return Err(ClientError::Rpc {
                code: -32000,
                message,
            });
        }

        let sender = from.address();
        let nonce = {
            let entry = inner.nonces.entry(sender).or_insert(0);
            let nonce = *entry;
            *entry += 1;
            nonce
        };

        let mut preimage = sender.to_vec();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        preimage.extend_from_slice(&tx.data);
        let hash: TxHash = keccak256(&preimage);

        let revert = std::mem::take(&mut inner.revert_next);
        let (status, contract_address, logs) = if revert {
            (false, None, Vec::new())
        } else {
            match tx.to {
                None => {
                    let address = sender.create(nonce);
                    inner.contracts.insert(
                        address,
                        MockContract {
                            code: tx.data.clone(),
                            ..MockContract::default()
                        },
                    );
                    (true, Some(address), Vec::new())
                }
                Some(to) => match inner.execute(sender, to, &tx.data) {
                    Some(logs) => (true, None, logs),
                    None => (false, None, Vec::new()),
                },
            }
        };

        inner.block_number += 1;
        let receipt = Receipt {
            transaction_hash: hash,
            block_number: inner.block_number,
            status,
            contract_address,
            gas_used: 21_000 + 16 * tx.data.len() as u64,
            logs,
        };
        if !inner.withhold_receipts {
            inner.receipts.insert(hash, receipt);
        }

        Ok(hash)
    }

    fn transaction_receipt(&self, hash: &TxHash) -> ClientResult<Option<Receipt>> {
        let mut inner = self.inner.lock().unwrap();
        inner.counts.transaction_receipt += 1;
        if inner.mine_on_poll {
            inner.block_number += 1;
        }
        Ok(inner.receipts.get(hash).cloned())
    }

    fn call(&self, to: &Address, data: &[u8]) -> ClientResult<Vec<u8>> {
        let mut inner = self.inner.lock().unwrap();
        inner.counts.call += 1;
        if let Some(message) = inner.fail_next_call.take() {
            return Err(ClientError::Rpc {
                code: -32000,
                message,
            });
        }
        inner.read(to, data)
    }

    fn code_at(&self, address: &Address) -> ClientResult<Vec<u8>> {
        let mut inner = self.inner.lock().unwrap();
        inner.counts.code_at += 1;
        Ok(inner
            .contracts
            .get(address)
            .map(|c| c.code.clone())
            .unwrap_or_default())
    }
}
