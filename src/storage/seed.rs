//! Built-in challenge catalog used to populate an empty database.

use crate::error::Result;
use crate::model::NewChallenge;
use crate::storage::challenges::ChallengeRepository;
use tracing::{debug, info};

/// `(title, description, category)` triples.
pub const CATALOG: &[(&str, &str, &str)] = &[
    ("Beba mais água", "Beba pelo menos 2 litros de água ao longo do dia.", "Saúde"),
    ("Durma melhor", "Desligue todos os aparelhos eletrônicos 1 hora antes de dormir.", "Saúde"),
    ("Alongamento matinal", "Faça 10 minutos de alongamento logo ao acordar.", "Saúde"),
    ("Postura correta", "Verifique e corrija sua postura a cada hora durante o trabalho.", "Saúde"),
    ("Caminhada leve", "Faça uma caminhada de 15 minutos após o almoço.", "Saúde"),
    ("Técnica Pomodoro", "Trabalhe por 25 minutos e descanse por 5 minutos, repetindo o ciclo.", "Produtividade"),
    ("Lista de tarefas", "Escreva suas 3 tarefas mais importantes para o dia logo pela manhã.", "Produtividade"),
    ("Zero notificações", "Desligue as notificações do celular durante 2 horas de trabalho.", "Produtividade"),
    ("Organização de e-mails", "Reserve 20 minutos para organizar sua caixa de entrada.", "Produtividade"),
    ("Planejamento semanal", "Dedique 30 minutos para planejar sua semana no domingo.", "Produtividade"),
    ("Desenho livre", "Desenhe por 15 minutos sem julgar o resultado.", "Criatividade"),
    ("Escrita criativa", "Escreva uma história curta baseada em uma palavra aleatória.", "Criatividade"),
    ("Fotografia diária", "Tire uma foto de algo que achou interessante hoje.", "Criatividade"),
    ("Música nova", "Escute um gênero musical que você normalmente não ouve.", "Criatividade"),
    ("Brainstorming", "Anote 20 ideias para resolver um problema atual.", "Criatividade"),
    ("Gratidão diária", "Anote 3 coisas pelas quais você é grato hoje.", "Bem-estar"),
    ("Desconexão digital", "Fique 2 horas sem usar nenhum dispositivo eletrônico.", "Bem-estar"),
    ("Contato com a natureza", "Passe 20 minutos em um parque ou jardim.", "Bem-estar"),
    ("Autocompaixão", "Pratique falar consigo mesmo como falaria com um bom amigo.", "Bem-estar"),
    ("Respiração consciente", "Faça 10 respirações profundas quando se sentir estressado.", "Bem-estar"),
    ("Aprendizado de idioma", "Estude um novo idioma por 15 minutos.", "Educação"),
    ("Documentário educativo", "Assista a um documentário sobre um tema que desconhece.", "Educação"),
    ("Leitura técnica", "Leia um artigo científico ou técnico da sua área.", "Educação"),
    ("Podcast informativo", "Ouça um podcast educativo durante o deslocamento.", "Educação"),
    ("Curso online", "Dedique 30 minutos para avançar em um curso online.", "Educação"),
    ("Treino HIIT", "Faça 15 minutos de exercícios de alta intensidade.", "Fitness"),
    ("Yoga básico", "Pratique 20 minutos de yoga seguindo um vídeo online.", "Fitness"),
    ("Agachamentos", "Realize 3 séries de 15 agachamentos ao longo do dia.", "Fitness"),
    ("Subir escadas", "Use as escadas em vez do elevador durante todo o dia.", "Fitness"),
    ("Flexões adaptadas", "Faça 3 séries de flexões (adaptadas ao seu nível).", "Fitness"),
    ("Leitura de autoajuda", "Leia 10 páginas de um livro de desenvolvimento pessoal.", "Desenvolvimento Pessoal"),
    ("Definição de metas", "Estabeleça uma meta específica para o próximo mês.", "Desenvolvimento Pessoal"),
    ("Feedback construtivo", "Peça feedback sincero para alguém de confiança.", "Desenvolvimento Pessoal"),
    ("Habilidade nova", "Dedique 30 minutos para aprender uma nova habilidade.", "Desenvolvimento Pessoal"),
    ("Reflexão diária", "Reflita sobre seus comportamentos e decisões do dia.", "Desenvolvimento Pessoal"),
    ("Refeição sem distrações", "Faça uma refeição sem usar celular ou assistir TV.", "Alimentação"),
    ("Experimentar alimento novo", "Inclua um alimento que nunca experimentou em sua refeição.", "Alimentação"),
    ("Preparo de marmita", "Prepare marmitas saudáveis para 3 dias da semana.", "Alimentação"),
    ("Redução de açúcar", "Substitua doces por frutas durante um dia inteiro.", "Alimentação"),
    ("Hidratação consciente", "Beba um copo de água antes de cada refeição.", "Alimentação"),
    ("Meditação guiada", "Faça 10 minutos de meditação guiada por um aplicativo.", "Meditação"),
    ("Atenção plena", "Pratique mindfulness durante uma atividade rotineira.", "Meditação"),
    ("Escaneamento corporal", "Faça um escaneamento corporal de 5 minutos antes de dormir.", "Meditação"),
    ("Meditação da manhã", "Medite por 5 minutos logo após acordar.", "Meditação"),
    ("Caminhada meditativa", "Faça uma caminhada de 15 minutos prestando atenção em cada passo.", "Meditação"),
    ("Leitura diária", "Leia 20 páginas de um livro antes de dormir.", "Leitura"),
    ("Poesia", "Leia um poema e reflita sobre seu significado.", "Leitura"),
    ("Clube do livro", "Convide amigos para discutir um livro que todos leram.", "Leitura"),
    ("Biografia inspiradora", "Comece a ler a biografia de alguém que admira.", "Leitura"),
    ("Artigo de opinião", "Leia um artigo de opinião sobre um tema atual.", "Leitura"),
];

/// Insert the built-in catalog when the challenges table is empty.
///
/// Returns the number of challenges inserted (zero when the catalog was
/// already populated).
///
/// # Errors
///
/// Returns an error if counting or inserting fails.
pub fn seed_catalog(challenges: &ChallengeRepository) -> Result<usize> {
    let existing = challenges.count()?;
    if existing > 0 {
        debug!(existing, "Catalog already populated; skipping seed");
        return Ok(0);
    }

    for (title, description, category) in CATALOG {
        challenges.create(&NewChallenge::new(*title, *description, *category))?;
    }
    info!(count = CATALOG.len(), "Seeded challenge catalog");
    Ok(CATALOG.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use std::collections::HashMap;

    #[test]
    fn seeds_once() {
        let storage = Storage::open_memory().unwrap();
        let repo = storage.challenges();
        assert_eq!(seed_catalog(&repo).unwrap(), CATALOG.len());
        assert_eq!(seed_catalog(&repo).unwrap(), 0);
        assert_eq!(repo.count().unwrap(), i64::try_from(CATALOG.len()).unwrap());
    }

    #[test]
    fn catalog_has_five_per_category() {
        let mut per_category: HashMap<&str, usize> = HashMap::new();
        for (_, _, category) in CATALOG {
            *per_category.entry(category).or_default() += 1;
        }
        assert_eq!(CATALOG.len(), 50);
        assert_eq!(per_category.len(), 10);
        assert!(per_category.values().all(|&n| n == 5), "{per_category:?}");
        assert_eq!(per_category.get("Saúde"), Some(&5));
        assert_eq!(per_category.get("Desenvolvimento Pessoal"), Some(&5));
    }

    #[test]
    fn seeded_rows_keep_accented_text() {
        let storage = Storage::open_memory().unwrap();
        let repo = storage.challenges();
        seed_catalog(&repo).unwrap();
        let meditation = repo.list_all(Some("Meditação")).unwrap();
        assert_eq!(meditation.len(), 5);
        assert_eq!(meditation[0].title, "Meditação guiada");
    }
}
