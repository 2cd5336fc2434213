// src/trends/fallback.rs
//! Static sample set served when every provider comes back empty.

use crate::trends::types::{SourceKind, TrendRecord, TrendTier};

struct Sample {
    term: &'static str,
    origin: &'static str,
    status: &'static str,
    tier: &'static str,
    description: &'static str,
}

const SAMPLES: &[Sample] = &[
    Sample { term: "Promptar", origin: "PORTUGAL", status: "Emergente", tier: "Explosiva", description: "(Verbo) A arte de saber conversar com máquinas. Representa a simbiose entre a linguagem natural e o código IA." },
    Sample { term: "Alucinar", origin: "Técnica", status: "Recontextualizado", tier: "Alta", description: "(Novo sentido) Quando uma informação parece real mas é puramente inventada por um sistema sintético." },
    Sample { term: "Desdigitalizar", origin: "PT/BR", status: "Tendência 2026", tier: "Crescente", description: "(Oposição) O ato deliberado de desconectar para recuperar processos analógicos e o foco humano." },
    Sample { term: "Glow up", origin: "Anglicismo", status: "Estabilizado", tier: "Estável", description: "(Estabilizado) Transformação positiva de aparência ou estilo de vida, popularizado por algoritmos de imagem." },
    Sample { term: "Tankar", origin: "Gamer", status: "Viral", tier: "Alta", description: "(Verbo) Conseguir aguentar ou suportar uma situação difícil. Transposição da mecânica de jogos para a vida real." },
    Sample { term: "Mudar o chip", origin: "PORTUGAL", status: "Estabilizado", tier: "Média", description: "(Idiomatismo) Expressão que utiliza a metáfora do hardware para indicar uma mudança radical de atitude." },
    Sample { term: "Lacrar", origin: "BRASIL", status: "Evolução", tier: "Estabilizada", description: "(Evolução) Antes era apenas fechar; agora é dar uma resposta definitiva ou vencer um debate com autoridade." },
    Sample { term: "Biscoitar", origin: "BRASIL", status: "Social", tier: "Alta", description: "(Verbo) Procurar validação ou elogios nas redes sociais de forma óbvia. Alusão ao prémio por comportamento esperado." },
    Sample { term: "Bué", origin: "ANGOLA", status: "Universal", tier: "Estável", description: "(Expansão) Termo angolano que se tornou universal no português europeu para significar 'muito'." },
    Sample { term: "Cringe", origin: "Global", status: "Geracional", tier: "Baixa", description: "(Sentimento) Vergonha alheia. Termo que define o conflito estético entre gerações nativas digitais." },
    Sample { term: "Meme", origin: "Bluesky", status: "Viral", tier: "Alta", description: "(Neologismo) Ideia viral que se espalha na internet de forma autónoma." },
    Sample { term: "Trollar", origin: "Bluesky", status: "Social", tier: "Média", description: "(Verbo) Provocar ou ofender nas redes sociais de forma deliberada." },
    Sample { term: "Vibe", origin: "Bluesky", status: "Social", tier: "Alta", description: "(Substantivo) Sensação, clima, energia que se transmite." },
    Sample { term: "Flexar", origin: "Bluesky", status: "Social", tier: "Média", description: "(Verbo) Ostentar ou mostrar-se de forma exagerada." },
    Sample { term: "Ghostar", origin: "Bluesky", status: "Emergente", tier: "Crescente", description: "(Verbo) Desaparecer de repente de um relacionamento ou amizade." },
    Sample { term: "Fake", origin: "Bluesky", status: "Social", tier: "Alta", description: "(Adjetivo) Falso, mentiroso, enganoso." },
    Sample { term: "Cancelar", origin: "Bluesky", status: "Emergente", tier: "Alta", description: "(Verbo) Rejeitar publicamente ou boicotar algo ou alguém." },
    Sample { term: "Shippar", origin: "Bluesky", status: "Social", tier: "Média", description: "(Verbo) Apoiar romanticamente um casal (real ou fictício)." },
    Sample { term: "Avatar", origin: "Bluesky", status: "Emergente", tier: "Crescente", description: "(Substantivo) Representação virtual de si mesmo no mundo digital." },
    Sample { term: "Plot Twist", origin: "Bluesky", status: "Social", tier: "Média", description: "(Expressão) Reviravolta inesperada numa história." },
];

/// The embedded sample set as fully-formed records.
pub fn sample_records() -> Vec<TrendRecord> {
    SAMPLES
        .iter()
        .map(|s| TrendRecord {
            term: s.term.to_string(),
            origin: s.origin.to_string(),
            status: s.status.to_string(),
            trend: TrendTier::from_label(s.tier),
            description: s.description.to_string(),
            raw_traffic: None,
            published_at: None,
            source_kind: SourceKind::Fallback,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_satisfy_record_invariants() {
        let recs = sample_records();
        assert_eq!(recs.len(), SAMPLES.len());
        assert!(!recs.is_empty());
        for r in &recs {
            assert!(!r.term.trim().is_empty());
            assert!(!r.description.trim().is_empty());
            assert_eq!(r.source_kind, SourceKind::Fallback);
        }
    }

    #[test]
    fn literal_tiers_are_bucketed() {
        let recs = sample_records();
        assert_eq!(recs[0].trend, TrendTier::Explosive);
        assert_eq!(recs[3].trend, TrendTier::Normal);
        assert_eq!(recs[9].trend, TrendTier::Low);
    }
}
