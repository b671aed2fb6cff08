use anyhow::{anyhow, Result};
use engine::{
    merkle_root,
    types::{LeafEncoding, MerkleRequest, MerkleResponse},
    Digest,
};

#[derive(Clone)]
pub struct MerkledClient {
    base: String,
    http: reqwest::Client,
}

impl MerkledClient {
    pub fn new(base: String) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn health(&self) -> Result<String> {
        let url = format!("{}/health", self.base);
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(anyhow!("health failed: {}", resp.status()));
        }
        Ok(resp.text().await?)
    }

    /// Send raw leaves hex-encoded so arbitrary bytes survive the JSON body.
    pub async fn merkle_root(&self, leaves: &[Vec<u8>]) -> Result<MerkleResponse> {
        let url = format!("{}/merkle", self.base);
        let req = MerkleRequest::Encoded {
            leaves: leaves.iter().map(hex::encode).collect(),
            encoding: LeafEncoding::Hex,
        };
        let resp = self.http.post(url).json(&req).send().await?;
        if !resp.status().is_success() {
            return Err(anyhow!("merkle failed: {} {}", resp.status(), resp.text().await?));
        }
        Ok(resp.json().await?)
    }
}

/// Check a server response against a locally computed root.
pub fn verify_response(resp: &MerkleResponse, leaves: &[Vec<u8>]) -> Result<Digest> {
    if resp.leaf_count != leaves.len() {
        return Err(anyhow!(
            "leaf count mismatch: server saw {} but {} were sent",
            resp.leaf_count,
            leaves.len()
        ));
    }
    let remote = resp.root()?;
    let local = merkle_root(leaves)?;
    if remote != local {
        return Err(anyhow!(
            "merkle root mismatch: server={} local={}",
            resp.merkle_root,
            hex::encode(local)
        ));
    }
    Ok(local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_matching_root() {
        let leaves = vec![b"a".to_vec(), b"b".to_vec()];
        let root = merkle_root(&leaves).unwrap();
        let resp = MerkleResponse::new(&root, 2);
        assert_eq!(verify_response(&resp, &leaves).unwrap(), root);
    }

    #[test]
    fn verify_rejects_reordered_leaves() {
        let leaves = vec![b"a".to_vec(), b"b".to_vec()];
        let swapped = vec![b"b".to_vec(), b"a".to_vec()];
        let resp = MerkleResponse::new(&merkle_root(&swapped).unwrap(), 2);
        let err = verify_response(&resp, &leaves).unwrap_err();
        assert!(err.to_string().contains("merkle root mismatch"));
    }

    #[test]
    fn verify_rejects_count_mismatch() {
        let leaves = vec![b"a".to_vec()];
        let resp = MerkleResponse::new(&merkle_root(&leaves).unwrap(), 3);
        assert!(verify_response(&resp, &leaves).is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let c = MerkledClient::new("http://localhost:8080/".into());
        assert_eq!(c.base, "http://localhost:8080");
    }
}
