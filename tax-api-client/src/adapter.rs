use async_trait::async_trait;
use tax_core::{RateSourceError, TaxRate, TaxRateSource, TaxYear};
use tracing::debug;

use crate::client::ExternalTaxApiClient;

/// [`TaxRateSource`] served by the external tax authority.
#[derive(Clone)]
pub struct ExternalTaxRateAdapter {
    client: ExternalTaxApiClient,
}

impl ExternalTaxRateAdapter {
    pub fn new(client: ExternalTaxApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaxRateSource for ExternalTaxRateAdapter {
    async fn find_by_year(
        &self,
        year: TaxYear,
    ) -> Result<Option<TaxRate>, RateSourceError> {
        let brackets = self.client.get_tax_brackets(year).await?;
        if brackets.is_empty() {
            debug!(year = year.value(), "tax authority returned no brackets");
            return Ok(None);
        }

        TaxRate::new(year, brackets)
            .map(Some)
            .map_err(|e| RateSourceError::Malformed {
                year: year.value(),
                message: e.to_string(),
            })
    }
}
