use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{DataId, DataStatus, DataType, Resource};
use crate::error::ReslinkError;

#[derive(Debug, Clone, Deserialize)]
pub struct Sample {
    pub id: u64,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Data {
    pub id: DataId,
    pub slug: String,
    pub status: DataStatus,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub sample: Option<Sample>,
    #[serde(default)]
    pub output: BTreeMap<String, Value>,
}

impl Data {
    /// File names attached to this object, optionally restricted to one
    /// output field. Outputs are `{"file": name}` objects or lists of them.
    pub fn files(&self, field: Option<&str>) -> Vec<String> {
        let mut names = Vec::new();
        for (name, value) in &self.output {
            if let Some(field) = field {
                if name != field {
                    continue;
                }
            }
            collect_file_names(value, &mut names);
        }
        names
    }

    pub fn slug_for_link(&self) -> &str {
        self.sample
            .as_ref()
            .map(|sample| sample.slug.as_str())
            .unwrap_or(&self.slug)
    }

    pub fn peaks_bed_file(&self) -> Option<String> {
        file_name_of(self.output.get("peaks_bed")?)
    }
}

fn collect_file_names(value: &Value, names: &mut Vec<String>) {
    match value {
        Value::Object(_) => {
            if let Some(name) = file_name_of(value) {
                names.push(name);
            }
        }
        Value::Array(items) => {
            for item in items {
                if let Some(name) = file_name_of(item) {
                    names.push(name);
                }
            }
        }
        _ => {}
    }
}

fn file_name_of(value: &Value) -> Option<String> {
    value
        .as_object()?
        .get("file")?
        .as_str()
        .map(|name| name.to_string())
}

#[derive(Debug, Clone, Default)]
pub struct DataFilter {
    pub status: Option<DataStatus>,
    pub data_type: Option<DataType>,
}

impl DataFilter {
    pub fn ok_of_type(data_type: &DataType) -> Self {
        Self {
            status: Some(DataStatus::Ok),
            data_type: Some(data_type.clone()),
        }
    }

    pub fn of_type(data_type: &DataType) -> Self {
        Self {
            status: None,
            data_type: Some(data_type.clone()),
        }
    }
}

pub trait ResolweClient: Send + Sync {
    fn resource_data(
        &self,
        resource: &Resource,
        filter: &DataFilter,
    ) -> Result<Vec<Data>, ReslinkError>;

    fn sample_data(
        &self,
        sample: &Sample,
        filter: &DataFilter,
    ) -> Result<Vec<Data>, ReslinkError>;

    fn sample_background(&self, sample: &Sample) -> Result<Option<Sample>, ReslinkError>;
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    results: Vec<T>,
}

#[derive(Clone)]
pub struct ResolweHttpClient {
    client: Client,
    base_url: String,
}

impl ResolweHttpClient {
    pub fn new(base_url: &str) -> Result<Self, ReslinkError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("reslink/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ReslinkError::ApiHttp(err.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| ReslinkError::ApiHttp(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn data_query(&self, scope: (&str, u64), filter: &DataFilter) -> Result<Vec<Data>, ReslinkError> {
        let mut request = self.client.get(format!("{}/data", self.base_url));
        request = request.query(&[(scope.0, scope.1.to_string())]);
        if let Some(status) = filter.status {
            request = request.query(&[("status", status.as_str())]);
        }
        if let Some(data_type) = &filter.data_type {
            request = request.query(&[("type", data_type.as_str())]);
        }

        let response = request
            .send()
            .map_err(|err| ReslinkError::ApiHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "data query failed".to_string());
            return Err(ReslinkError::ApiStatus { status, message });
        }

        let list: ListResponse<Data> = response
            .json()
            .map_err(|err| ReslinkError::ApiHttp(err.to_string()))?;
        Ok(list.results)
    }
}

impl ResolweClient for ResolweHttpClient {
    fn resource_data(
        &self,
        resource: &Resource,
        filter: &DataFilter,
    ) -> Result<Vec<Data>, ReslinkError> {
        let scope = match resource {
            Resource::Sample(id) => ("entity", *id),
            Resource::Collection(id) => ("collection", *id),
        };
        self.data_query(scope, filter)
    }

    fn sample_data(
        &self,
        sample: &Sample,
        filter: &DataFilter,
    ) -> Result<Vec<Data>, ReslinkError> {
        self.data_query(("entity", sample.id), filter)
    }

    fn sample_background(&self, sample: &Sample) -> Result<Option<Sample>, ReslinkError> {
        let response = self
            .client
            .get(format!("{}/sample/{}/background", self.base_url, sample.id))
            .send()
            .map_err(|err| ReslinkError::ApiHttp(err.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "background lookup failed".to_string());
            return Err(ReslinkError::ApiStatus { status, message });
        }

        let background: Sample = response
            .json()
            .map_err(|err| ReslinkError::ApiHttp(err.to_string()))?;
        Ok(Some(background))
    }
}
