// src/services/status_engine.rs
//
// Motor de transição de status: funções puras sobre `ProductLineItem`.
// Toda a orquestração (leitura, escrita, e-mail) fica no RmaService;
// aqui não há I/O nenhum.

use chrono::{DateTime, Utc};

use crate::{
    common::error::AppError,
    models::rma::{ProductLineItem, ProductStatus, RmaCase},
};

/// Próximo estágio do pipeline linear. `None` para `delivered`: o chamador
/// reporta "no further action", não é um erro.
pub fn next_status(current: ProductStatus) -> Option<ProductStatus> {
    match current {
        ProductStatus::Processing => Some(ProductStatus::InServiceCentre),
        ProductStatus::InServiceCentre => Some(ProductStatus::Ready),
        ProductStatus::Ready => Some(ProductStatus::Delivered),
        ProductStatus::Delivered => None,
    }
}

/// OTP de entrega: 6 dígitos, uniforme em 100000..=999999 (nunca um valor
/// de 5 dígitos com zero à esquerda). Código operacional de conferência,
/// não um token de segurança.
pub fn generate_otp() -> String {
    rand::random_range(100_000u32..=999_999).to_string()
}

/// Status agregado do case, derivado do multiconjunto de status dos
/// produtos. Precedência canônica (viés "mais avançado, mas não concluído"):
///
/// 1. todos `delivered`                    -> `delivered`
/// 2. todos em {`ready`, `delivered`}      -> `ready`
/// 3. algum `in_service_centre` ou `ready` -> `in_service_centre`
/// 4. caso contrário                       -> `processing`
///
/// Um case com um produto `processing` e outro `ready` agrega para
/// `in_service_centre`; comportamento deliberado, não alterar sem rever
/// as abas do dashboard. A ordem dos produtos não afeta o resultado.
pub fn aggregate_status(statuses: &[ProductStatus]) -> ProductStatus {
    if statuses.is_empty() {
        return ProductStatus::Processing;
    }
    if statuses.iter().all(|s| *s == ProductStatus::Delivered) {
        return ProductStatus::Delivered;
    }
    if statuses
        .iter()
        .all(|s| matches!(s, ProductStatus::Ready | ProductStatus::Delivered))
    {
        return ProductStatus::Ready;
    }
    if statuses
        .iter()
        .any(|s| matches!(s, ProductStatus::InServiceCentre | ProductStatus::Ready))
    {
        return ProductStatus::InServiceCentre;
    }
    ProductStatus::Processing
}

/// Referência ao centro de serviço exigida na entrada em `in_service_centre`.
#[derive(Debug, Clone)]
pub struct ServiceCentreRef {
    pub id: String,
    pub name: String,
}

/// Contexto de uma transição em lote.
#[derive(Debug, Clone, Default)]
pub struct TransitionContext {
    pub service_centre: Option<ServiceCentreRef>,
    pub remark: Option<String>,
    // OTP compartilhado do lote: todos os produtos marcados `ready` na mesma
    // ação recebem o mesmo código.
    pub batch_otp: Option<String>,
}

/// Transformação pura de um produto para o próximo status.
///
/// Rejeita transições fora da ordem canônica. Efeitos colaterais por alvo:
/// - `in_service_centre`: exige centro de serviço; grava referência e remark;
/// - `ready`: carimba OTP novo SEMPRE (a verificação é que é opcional, não a
///   geração) e liga `isReady`;
/// - `delivered`: carimba `deliveredAt` e liga `isDelivered`.
pub fn advance_product(
    product: &ProductLineItem,
    next: ProductStatus,
    ctx: &TransitionContext,
    now: DateTime<Utc>,
) -> Result<ProductLineItem, AppError> {
    if next_status(product.status) != Some(next) {
        return Err(AppError::workflow(format!(
            "Product '{}' cannot move from '{}' to '{}'.",
            product.id, product.status, next
        )));
    }

    let mut updated = product.clone();
    updated.status = next;

    match next {
        ProductStatus::InServiceCentre => {
            let centre = ctx
                .service_centre
                .as_ref()
                .ok_or_else(|| AppError::workflow("Service centre is required"))?;
            updated.service_centre_id = Some(centre.id.clone());
            updated.service_centre_name = Some(centre.name.clone());
            if let Some(remark) = &ctx.remark {
                updated.remark = Some(remark.clone());
            }
        }
        ProductStatus::Ready => {
            let otp = ctx.batch_otp.clone().unwrap_or_else(generate_otp);
            updated.otp = Some(otp);
            updated.is_ready = true;
        }
        ProductStatus::Delivered => {
            updated.delivered_at = Some(now);
            updated.is_delivered = true;
        }
        ProductStatus::Processing => unreachable!("processing nunca é alvo de transição"),
    }

    Ok(updated)
}

/// Troca o OTP de um produto `ready` sem mexer no status. O código antigo
/// deixa de valer imediatamente; o chamador dispara o e-mail "ready" novo.
pub fn resend_otp(product: &ProductLineItem) -> Result<ProductLineItem, AppError> {
    if product.status != ProductStatus::Ready {
        return Err(AppError::workflow(format!(
            "Product '{}' is not ready for dispatch; there is no OTP to resend.",
            product.id
        )));
    }
    let mut updated = product.clone();
    updated.otp = Some(generate_otp());
    Ok(updated)
}

/// Validação da confirmação de entrega. Com `require_otp` desligado a
/// entrega passa sem código; ligado, o código submetido precisa ser
/// string-igual ao armazenado. Tentativas são ilimitadas.
pub fn validate_delivery_code(
    product: &ProductLineItem,
    submitted: Option<&str>,
    require_otp: bool,
) -> Result<(), AppError> {
    if !require_otp {
        return Ok(());
    }
    let submitted = submitted.unwrap_or("").trim();
    if submitted.is_empty() {
        return Err(AppError::workflow("OTP is required"));
    }
    if Some(submitted) != product.otp.as_deref() {
        return Err(AppError::workflow("Incorrect OTP"));
    }
    Ok(())
}

/// Resolve uma seleção explícita de produtos dentro de um case.
/// Seleção vazia é rejeitada; id desconhecido idem (nada de no-op
/// silencioso em ação de lote).
pub fn select_products<'a>(
    case: &'a RmaCase,
    product_ids: &[String],
) -> Result<Vec<&'a ProductLineItem>, AppError> {
    if product_ids.is_empty() {
        return Err(AppError::workflow("No products selected"));
    }
    let mut selected = Vec::with_capacity(product_ids.len());
    for id in product_ids {
        let product = case
            .product(id)
            .ok_or_else(|| AppError::not_found(format!("Product '{id}' not found in RMA '{}'.", case.id)))?;
        selected.push(product);
    }
    Ok(selected)
}

/// Produtos de um case elegíveis para uma transição ao status alvo.
pub fn eligible_for(case: &RmaCase, target: ProductStatus) -> Vec<&ProductLineItem> {
    case.products
        .iter()
        .filter(|p| next_status(p.status) == Some(target))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn product(id: &str, status: ProductStatus) -> ProductLineItem {
        ProductLineItem {
            id: id.to_string(),
            brand: "Acme".to_string(),
            model_number: "X1".to_string(),
            serial_number: format!("SER-{id}"),
            problems_reported: "Does not turn on".to_string(),
            status,
            service_centre_id: None,
            service_centre_name: None,
            remark: None,
            otp: None,
            is_ready: false,
            is_delivered: false,
            delivered_at: None,
            custom_fields: BTreeMap::new(),
        }
    }

    fn centre_ctx() -> TransitionContext {
        TransitionContext {
            service_centre: Some(ServiceCentreRef { id: "sc1".into(), name: "Centre1".into() }),
            remark: Some("screen replacement".into()),
            batch_otp: None,
        }
    }

    #[test]
    fn status_chain_is_linear_and_terminal() {
        let mut sequence = vec![ProductStatus::Processing];
        let mut current = ProductStatus::Processing;
        while let Some(next) = next_status(current) {
            sequence.push(next);
            current = next;
        }
        assert_eq!(
            sequence,
            vec![
                ProductStatus::Processing,
                ProductStatus::InServiceCentre,
                ProductStatus::Ready,
                ProductStatus::Delivered,
            ]
        );
        assert_eq!(next_status(ProductStatus::Delivered), None);
    }

    #[test]
    fn aggregate_follows_the_canonical_precedence() {
        use ProductStatus::*;
        assert_eq!(aggregate_status(&[Delivered]), Delivered);
        assert_eq!(aggregate_status(&[Ready, Delivered]), Ready);
        assert_eq!(aggregate_status(&[Processing, Ready]), InServiceCentre);
        assert_eq!(aggregate_status(&[Processing, Processing]), Processing);
        assert_eq!(aggregate_status(&[InServiceCentre]), InServiceCentre);
        assert_eq!(aggregate_status(&[Processing, InServiceCentre, Delivered]), InServiceCentre);
    }

    #[test]
    fn aggregate_ignores_ordering() {
        use ProductStatus::*;
        let combos: Vec<Vec<ProductStatus>> = vec![
            vec![Processing, Ready, Delivered],
            vec![Delivered, Processing, Ready],
            vec![Ready, Delivered, Processing],
        ];
        let expected = aggregate_status(&combos[0]);
        for combo in &combos {
            assert_eq!(aggregate_status(combo), expected);
        }
    }

    #[test]
    fn otp_is_six_digits_in_range_and_roughly_uniform() {
        // 10k sorteios: tudo no intervalo e distribuição razoável por
        // primeiro dígito (sanidade, não teste criptográfico).
        let mut buckets = [0usize; 9];
        for _ in 0..10_000 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            let value: u32 = otp.parse().expect("OTP deve ser numérico");
            assert!((100_000..=999_999).contains(&value));
            buckets[(value / 100_000 - 1) as usize] += 1;
        }
        // Esperado ~1111 por balde; uma faixa folgada segura contra flakes.
        for count in buckets {
            assert!((800..1500).contains(&count), "distribuição enviesada: {buckets:?}");
        }
    }

    #[test]
    fn advance_to_service_centre_requires_a_centre() {
        let p = product("1", ProductStatus::Processing);
        let err = advance_product(
            &p,
            ProductStatus::InServiceCentre,
            &TransitionContext::default(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Service centre is required"));

        let updated =
            advance_product(&p, ProductStatus::InServiceCentre, &centre_ctx(), Utc::now()).unwrap();
        assert_eq!(updated.status, ProductStatus::InServiceCentre);
        assert_eq!(updated.service_centre_name.as_deref(), Some("Centre1"));
        assert_eq!(updated.remark.as_deref(), Some("screen replacement"));
    }

    #[test]
    fn marking_ready_always_stamps_an_otp() {
        let p = product("1", ProductStatus::InServiceCentre);
        let updated =
            advance_product(&p, ProductStatus::Ready, &TransitionContext::default(), Utc::now())
                .unwrap();
        assert!(updated.is_ready);
        let otp = updated.otp.expect("OTP deve ser carimbado");
        assert_eq!(otp.len(), 6);

        // Com OTP de lote, todos os produtos recebem o mesmo código.
        let ctx = TransitionContext { batch_otp: Some("123456".into()), ..Default::default() };
        let updated = advance_product(&p, ProductStatus::Ready, &ctx, Utc::now()).unwrap();
        assert_eq!(updated.otp.as_deref(), Some("123456"));
    }

    #[test]
    fn delivering_stamps_delivered_at() {
        let mut p = product("1", ProductStatus::Ready);
        p.otp = Some("111222".into());
        let now = Utc::now();
        let updated =
            advance_product(&p, ProductStatus::Delivered, &TransitionContext::default(), now)
                .unwrap();
        assert!(updated.is_delivered);
        assert_eq!(updated.delivered_at, Some(now));
    }

    #[test]
    fn skipping_a_stage_is_rejected() {
        let p = product("1", ProductStatus::Processing);
        let err = advance_product(
            &p,
            ProductStatus::Ready,
            &TransitionContext::default(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("cannot move"));
    }

    #[test]
    fn delivery_code_validation_matrix() {
        let mut p = product("1", ProductStatus::Ready);
        p.otp = Some("654321".into());

        // requireOtp ligado
        assert!(validate_delivery_code(&p, Some("654321"), true).is_ok());
        let err = validate_delivery_code(&p, Some("111111"), true).unwrap_err();
        assert!(err.to_string().contains("Incorrect OTP"));
        let err = validate_delivery_code(&p, Some(""), true).unwrap_err();
        assert!(err.to_string().contains("OTP is required"));
        let err = validate_delivery_code(&p, None, true).unwrap_err();
        assert!(err.to_string().contains("OTP is required"));

        // requireOtp desligado: entrega passa sem código
        assert!(validate_delivery_code(&p, None, false).is_ok());
    }

    #[test]
    fn resend_replaces_the_code_without_touching_status() {
        let mut p = product("1", ProductStatus::Ready);
        p.otp = Some("100001".into());

        // Numa sequência de reenvios o código tem que mudar em relação ao
        // armazenado (estatisticamente: 10 tentativas idênticas seguidas
        // teriam chance ~1e-59).
        let mut changed = false;
        for _ in 0..10 {
            let updated = resend_otp(&p).unwrap();
            assert_eq!(updated.status, ProductStatus::Ready);
            if updated.otp != p.otp {
                changed = true;
                break;
            }
        }
        assert!(changed, "o reenvio nunca trocou o código");

        let not_ready = product("2", ProductStatus::Processing);
        assert!(resend_otp(&not_ready).is_err());
    }

    #[test]
    fn empty_selection_is_rejected() {
        let case = RmaCase {
            id: "rma1".into(),
            contact_id: String::new(),
            contact_name: String::new(),
            contact_email: String::new(),
            contact_phone: String::new(),
            contact_company: String::new(),
            comments: String::new(),
            products: vec![product("1", ProductStatus::Processing)],
            status: ProductStatus::Processing,
            status_history: vec![],
            created_at: None,
            updated_at: None,
        };

        let err = select_products(&case, &[]).unwrap_err();
        assert!(err.to_string().contains("No products selected"));

        let err = select_products(&case, &["99".to_string()]).unwrap_err();
        assert!(err.to_string().contains("not found"));

        let ok = select_products(&case, &["1".to_string()]).unwrap();
        assert_eq!(ok.len(), 1);
    }

    #[test]
    fn eligible_for_filters_by_current_stage() {
        let case = RmaCase {
            id: "rma1".into(),
            contact_id: String::new(),
            contact_name: String::new(),
            contact_email: String::new(),
            contact_phone: String::new(),
            contact_company: String::new(),
            comments: String::new(),
            products: vec![
                product("1", ProductStatus::Processing),
                product("2", ProductStatus::InServiceCentre),
                product("3", ProductStatus::InServiceCentre),
            ],
            status: ProductStatus::InServiceCentre,
            status_history: vec![],
            created_at: None,
            updated_at: None,
        };

        let eligible = eligible_for(&case, ProductStatus::Ready);
        let ids: Vec<&str> = eligible.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }
}
