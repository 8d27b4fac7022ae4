//! Estimate lifecycle: requests, estimates, and client confirmation.

use crate::{
    error::Result, model::validate_price, ClientId, Error, Estimate, EstimateId, MoveRequest,
    MoverId, NewMoveRequest, RequestId, Store, Timestamp,
};

impl Store {
    /// Record a client's move request.
    pub fn create_request(
        &mut self,
        client: ClientId,
        input: NewMoveRequest,
        now: Timestamp,
    ) -> Result<MoveRequest> {
        if self.client(client).is_none() {
            return Err(Error::ClientNotFound(client));
        }
        input.validate()?;

        let request = MoveRequest {
            id: RequestId::new(),
            client_id: client,
            move_type: input.move_type,
            move_date: input.move_date,
            departure: input.departure.trim().to_string(),
            arrival: input.arrival.trim().to_string(),
            created_at: now,
        };
        self.insert_request(request.clone());
        Ok(request)
    }

    /// Submit a mover's quote for a request.
    ///
    /// The estimate starts unconfirmed and the mover's `estimateCount` is
    /// refreshed in the same unit of work.
    pub fn create_estimate(
        &mut self,
        mover: MoverId,
        client: ClientId,
        request: RequestId,
        price: u64,
        comment: impl Into<String>,
        now: Timestamp,
    ) -> Result<Estimate> {
        if self.mover(mover).is_none() {
            return Err(Error::MoverNotFound(mover));
        }
        let owner = self
            .request(request)
            .ok_or(Error::RequestNotFound(request))?
            .client_id;
        if owner != client {
            return Err(Error::RequestClientMismatch { request, client });
        }
        validate_price(price)?;

        let estimate = Estimate {
            id: EstimateId::new(),
            request_id: request,
            mover_id: mover,
            client_id: client,
            price,
            comment: comment.into().trim().to_string(),
            is_client_confirmed: false,
            confirmed_at: None,
            created_at: now,
        };
        self.insert_estimate(estimate.clone())?;
        self.refresh_aggregates(mover);
        Ok(estimate)
    }

    /// Mark an estimate as accepted by its client.
    ///
    /// Idempotent: confirming twice leaves the first confirmation in place.
    pub fn confirm_estimate(
        &mut self,
        client: ClientId,
        id: EstimateId,
        now: Timestamp,
    ) -> Result<Estimate> {
        let estimate = self.estimate_mut(id).ok_or(Error::EstimateNotFound(id))?;
        if estimate.client_id != client {
            return Err(Error::NotOwner {
                resource: "estimate",
                id: id.to_string(),
            });
        }
        if !estimate.is_client_confirmed {
            estimate.is_client_confirmed = true;
            estimate.confirmed_at = Some(now);
        }
        Ok(estimate.clone())
    }
}
