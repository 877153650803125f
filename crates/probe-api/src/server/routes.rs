async fn get_game(State(state): State<AppState>) -> Result<Json<ReconciledState>, HttpApiError> {
    let reconciled = state.store.load().await.map_err(HttpApiError::from_store)?;
    Ok(Json(reconciled))
}

async fn save_game(
    State(state): State<AppState>,
    Json(candidate): Json<GameState>,
) -> Result<Json<SaveReceipt>, HttpApiError> {
    state
        .store
        .save(&candidate)
        .await
        .map_err(HttpApiError::from_store)?;
    Ok(Json(SaveReceipt::ok()))
}

async fn reset_game(State(state): State<AppState>) -> Result<Json<SaveReceipt>, HttpApiError> {
    state
        .store
        .reset()
        .await
        .map_err(HttpApiError::from_store)?;
    Ok(Json(SaveReceipt::ok()))
}
