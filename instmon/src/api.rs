//! HTTP helpers for the agent's instance table.

use anyhow::{bail, Context};
use url::Url;

use crate::types::{Instance, NewInstance};

pub const DEFAULT_API: &str = "http://127.0.0.1:3000/";

pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base: &str) -> anyhow::Result<Self> {
        let mut base = Url::parse(base).with_context(|| format!("invalid API URL: {base}"))?;
        if !base.path().ends_with('/') {
            let p = format!("{}/", base.path());
            base.set_path(&p);
        }
        Ok(Self {
            base,
            http: reqwest::Client::new(),
        })
    }

    pub fn instances_url(&self) -> anyhow::Result<Url> {
        Ok(self.base.join("instances")?)
    }

    pub async fn list(&self) -> anyhow::Result<Vec<Instance>> {
        let resp = self.http.get(self.instances_url()?).send().await?;
        if !resp.status().is_success() {
            bail!("list failed: {}", resp.status());
        }
        Ok(resp.json().await?)
    }

    pub async fn create(&self, name: &str, ip: &str) -> anyhow::Result<Instance> {
        let resp = self
            .http
            .post(self.instances_url()?)
            .json(&NewInstance { name, ip })
            .send()
            .await?;
        if !resp.status().is_success() {
            bail!("create failed: {}", resp.status());
        }
        Ok(resp.json().await?)
    }

    pub async fn delete(&self, id: i64) -> anyhow::Result<()> {
        let mut url = self.instances_url()?;
        url.query_pairs_mut().append_pair("id", &id.to_string());
        let resp = self.http.delete(url).send().await?;
        if !resp.status().is_success() {
            bail!("delete failed: {}", resp.status());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instances_url_respects_prefix() {
        let c = ApiClient::new("http://localhost:3000").unwrap();
        assert_eq!(
            c.instances_url().unwrap().as_str(),
            "http://localhost:3000/instances"
        );
        let c = ApiClient::new("http://localhost:3000/api").unwrap();
        assert_eq!(
            c.instances_url().unwrap().as_str(),
            "http://localhost:3000/api/instances"
        );
    }
}
