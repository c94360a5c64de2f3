//! Single-shot fetches against the tax authority, without retries.

use serde_json::Value;
use tax_core::{TaxBracket, TaxBracketPrimitives, TaxRate};

use crate::errors::FetchError;
use crate::transport::HttpTransport;
use crate::types::{FALLBACK_TAX_YEAR, RequestContext, stable_url, tax_year_url};

pub(crate) const INVALID_PAYLOAD: &str = "Invalid tax brackets payload";
pub(crate) const INVALID_FALLBACK_PAYLOAD: &str = "Invalid fallback tax brackets payload";

/// Extracts the `tax_brackets` list from a response body.
///
/// Every entry must carry a numeric `min` and `rate`; `max` may be absent or
/// null for the open-ended top bracket. The entries must also form a valid
/// table (see [`TaxRate::validate_brackets`]). An empty list is returned
/// as-is.
pub fn validate_tax_brackets_response(
    body: Value,
    invalid_message: &str,
) -> Result<Vec<TaxBracket>, FetchError> {
    let malformed = |detail: String| FetchError::Malformed(format!("{invalid_message}: {detail}"));

    let Value::Object(mut fields) = body else {
        return Err(malformed("response is not an object".to_string()));
    };
    let Some(Value::Array(entries)) = fields.remove("tax_brackets") else {
        return Err(malformed("missing tax_brackets array".to_string()));
    };

    let brackets = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let primitives: TaxBracketPrimitives = serde_json::from_value(entry)
                .map_err(|e| malformed(format!("entry {index}: {e}")))?;
            TaxBracket::from_primitives(primitives)
                .map_err(|e| malformed(format!("entry {index}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    TaxRate::validate_brackets(&brackets).map_err(|e| malformed(e.to_string()))?;
    Ok(brackets)
}

pub(crate) async fn fetch_tax_brackets_for_year(
    transport: &dyn HttpTransport,
    base_url: &str,
    context: &RequestContext,
) -> Result<Vec<TaxBracket>, FetchError> {
    let body = transport
        .get(&tax_year_url(base_url, context.year), context)
        .await?;
    validate_tax_brackets_response(body, INVALID_PAYLOAD)
}

/// Queries the year-agnostic endpoint, whose table is the one of
/// [`FALLBACK_TAX_YEAR`].
pub(crate) async fn get_stable_tax_brackets(
    transport: &dyn HttpTransport,
    base_url: &str,
) -> Result<Vec<TaxBracket>, FetchError> {
    let context = RequestContext::for_year(FALLBACK_TAX_YEAR);
    let body = transport.get(&stable_url(base_url), &context).await?;
    validate_tax_brackets_response(body, INVALID_FALLBACK_PAYLOAD)
}
